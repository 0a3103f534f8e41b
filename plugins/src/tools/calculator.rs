use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tripcrew_core::api::{parse_args, FieldKind, InputSchema, Tool, ToolError, ToolSpec};

pub const TOOL_NAME: &str = "calculator";

const MAX_EXPRESSION_LEN: usize = 1024;
const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' | '(' | ')' => {
                chars.next();
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || matches!(d, '.' | ',' | '_') {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = parse_literal(&literal)
                    .ok_or_else(|| format!("invalid number '{literal}' at position {pos}"))?;
                tokens.push(Token::Number(value));
            }
            other => return Err(format!("unexpected character '{other}' at position {pos}")),
        }
    }
    Ok(tokens)
}

/// Parses a numeric literal. ',' is accepted only as a thousands separator in the
/// integer part, as in "5,000".
fn parse_literal(literal: &str) -> Option<f64> {
    if literal.contains('_') {
        return None;
    }
    let (int_part, frac_part) = match literal.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (literal, None),
    };
    if frac_part.is_some_and(|f| f.contains(',')) {
        return None;
    }
    let mut groups = int_part.split(',');
    let mut digits = groups.next().unwrap_or_default().to_string();
    for group in groups {
        if digits.is_empty() || group.len() != 3 {
            return None;
        }
        digits.push_str(group);
    }
    let normalized = match frac_part {
        Some(frac) => format!("{digits}.{frac}"),
        None => digits,
    };
    normalized.parse::<f64>().ok()
}

/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/') factor)*
/// factor := '-' factor | '+' factor | number | '(' expr ')'
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.advance();
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.advance();
            let rhs = self.factor()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err("division by zero".to_string());
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, String> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err("expression is nested too deeply".to_string());
        }
        let value = match self.advance() {
            Some(Token::Minus) => self.factor().map(|v| -v),
            Some(Token::Plus) => self.factor(),
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(tok) => Err(format!("unexpected {tok:?}")),
            None => Err("unexpected end of expression".to_string()),
        };
        self.depth -= 1;
        value
    }
}

/// Evaluates an arithmetic expression over numeric literals and `+ - * / ( )`.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    if expr.len() > MAX_EXPRESSION_LEN {
        return Err(format!("expression longer than {MAX_EXPRESSION_LEN} characters"));
    }
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(tok) = parser.peek() {
        return Err(format!("unexpected {tok:?} after complete expression"));
    }
    if !value.is_finite() {
        return Err("result is not a finite number".to_string());
    }
    Ok(value)
}

/// Integral results print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.abs() >= 1e15 {
        format!("{value}")
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let rounded = (value * 1e10).round() / 1e10;
        format!("{rounded}")
    }
}

#[derive(Debug, Deserialize)]
struct CalculatorArgs {
    expression: String,
}

#[derive(Debug, Clone)]
pub struct CalculatorTool {
    spec: ToolSpec,
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                TOOL_NAME,
                "Useful to perform any mathematical calculations, like sum, minus, \
                 multiplication, division, etc. The input should be a mathematical \
                 expression, a couple examples are `200*7` or `5000/2*10`.",
                InputSchema::new().required(
                    "expression",
                    FieldKind::String,
                    "Arithmetic expression using numbers, + - * / and parentheses.",
                ),
            ),
        }
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let args: CalculatorArgs = parse_args(TOOL_NAME, args)?;
        let value = evaluate(&args.expression).map_err(|message| ToolError::Evaluation {
            tool: TOOL_NAME.to_string(),
            message,
        })?;
        Ok(format_number(value))
    }
}
