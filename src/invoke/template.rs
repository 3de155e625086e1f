use crate::error::TemplateError;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Lit(String),
    Arg(usize),
}

type Token = Vec<Piece>;

/// 以空白分隔、带 `{n}` 位置占位符的命令模板。
///
/// 单独的 `>` 记号把子进程 stdout 重定向到其后的记号。
/// `{{` 与 `}}` 表示字面大括号。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    words: Vec<Token>,
    redirect: Option<Token>,
}

impl CommandTemplate {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut words = Vec::new();
        let mut redirect = None;
        let mut raw = template.split_whitespace();
        while let Some(tok) = raw.next() {
            if tok == ">" {
                let target = raw.next().ok_or(TemplateError::DanglingRedirect)?;
                redirect = Some(parse_token(target)?);
            } else {
                words.push(parse_token(tok)?);
            }
        }
        if words.is_empty() {
            return Err(TemplateError::Empty);
        }
        Ok(CommandTemplate {
            words,
            redirect,
        })
    }

    /// 模板需要的位置参数个数
    pub fn arity(&self) -> usize {
        self.words
            .iter()
            .chain(self.redirect.iter())
            .flatten()
            .filter_map(|p| match p {
                Piece::Arg(i) => Some(i + 1),
                Piece::Lit(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    pub fn expand(&self, args: &[&str]) -> Result<CommandLine, TemplateError> {
        let mut words = self
            .words
            .iter()
            .map(|t| render(t, args))
            .collect::<Result<Vec<_>, _>>()?;
        let program = words.remove(0);
        let stdout = match &self.redirect {
            Some(t) => Some(PathBuf::from(render(t, args)?)),
            None => None,
        };
        Ok(CommandLine {
            program,
            args: words,
            stdout,
        })
    }
}

fn parse_token(tok: &str) -> Result<Token, TemplateError> {
    let bad = || TemplateError::BadPlaceholder(tok.to_string());
    let mut pieces = Vec::new();
    let mut lit = String::new();
    let mut chars = tok.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                lit.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                lit.push('}');
            }
            '{' => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        _ => return Err(bad()),
                    }
                }
                let index = digits.parse::<usize>().map_err(|_| bad())?;
                if !lit.is_empty() {
                    pieces.push(Piece::Lit(std::mem::take(&mut lit)));
                }
                pieces.push(Piece::Arg(index));
            }
            '}' => return Err(bad()),
            _ => lit.push(c),
        }
    }
    if !lit.is_empty() {
        pieces.push(Piece::Lit(lit));
    }
    Ok(pieces)
}

fn render(token: &Token, args: &[&str]) -> Result<String, TemplateError> {
    let mut out = String::new();
    for piece in token {
        match piece {
            Piece::Lit(s) => out.push_str(s),
            Piece::Arg(index) => {
                let arg = args.get(*index).ok_or(TemplateError::MissingArgument {
                    index: *index,
                    given: args.len(),
                })?;
                out.push_str(arg);
            }
        }
    }
    Ok(out)
}

/// 展开完毕、可直接启动的命令。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub stdout: Option<PathBuf>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        if let Some(out) = &self.stdout {
            write!(f, " > {}", out.display())?;
        }
        Ok(())
    }
}
