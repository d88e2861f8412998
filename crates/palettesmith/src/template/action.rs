//! Action-syntax template engine.
//!
//! [`ActionEngine`] renders the `{{ ... }}` action language used by plugin
//! templates that are not Jinja files. Templates are parsed once, when added;
//! rendering walks the parsed nodes.
//!
//! # Syntax
//!
//! - `{{.key}}` substitutes a field value (missing keys render empty)
//! - `{{helper arg ...}}` calls a helper; arguments are `.key`, `"quoted"`
//!   or `` `raw` `` strings, numbers, `true`/`false`, or `(sub pipeline)`
//! - `{{.a | helper x}}` passes the previous result as the *last* argument
//! - `{{- ` and ` -}}` trim whitespace before/after the action
//! - `{{/* comment */}}` produces no output
//!
//! # Example
//!
//! ```rust
//! use palettesmith::template::{ActionEngine, FallbackLog, FieldData, TemplateEngine};
//!
//! let mut engine = ActionEngine::new(FallbackLog::new());
//! engine
//!     .add_template("t", r##"bg = {{.bg}}, dim = {{mix .bg "#000000" 0.5}}"##)
//!     .unwrap();
//!
//! let mut data = FieldData::new();
//! data.insert("bg".into(), "#ffffff".into());
//! assert_eq!(
//!     engine.render_named("t", &data).unwrap(),
//!     "bg = #ffffff, dim = #7f7f7f"
//! );
//! ```
//!
//! # Limitations
//!
//! There is no control flow: `if`, `range`, `with`, `define` and friends are
//! rejected at compile time. Use a `.j2` template for anything conditional.

use std::collections::HashMap;

use crate::error::RenderError;

use super::engine::{FieldData, TemplateEngine};
use super::helpers::{Arg, FallbackLog, Helper};

const KEYWORDS: &[&str] = &[
    "if", "else", "end", "range", "with", "define", "template", "block", "break", "continue",
    "nil",
];

/// Engine for the `{{.key}}` action syntax.
pub struct ActionEngine {
    templates: HashMap<String, Vec<Node>>,
    log: FallbackLog,
}

impl ActionEngine {
    pub fn new(log: FallbackLog) -> Self {
        Self {
            templates: HashMap::new(),
            log,
        }
    }
}

impl TemplateEngine for ActionEngine {
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        let nodes = parse_template(source).map_err(|message| RenderError::Syntax {
            name: name.to_string(),
            message,
        })?;
        self.templates.insert(name.to_string(), nodes);
        Ok(())
    }

    fn render_named(&self, name: &str, data: &FieldData) -> Result<String, RenderError> {
        let nodes = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::Execution {
                name: name.to_string(),
                message: "template not found".to_string(),
            })?;

        let mut out = String::new();
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action { line, pipeline } => {
                    let value = eval_pipeline(pipeline, data, &self.log).map_err(|message| {
                        RenderError::Execution {
                            name: name.to_string(),
                            message: format!("line {}: {}", line, message),
                        }
                    })?;
                    value.write_to(&mut out);
                }
            }
        }
        Ok(out)
    }

    fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

// ============================================================================
// Syntax tree
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Action { line: usize, pipeline: Pipeline },
}

#[derive(Debug, Clone, PartialEq)]
struct Pipeline {
    stages: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Operand(Operand),
    Call { helper: Helper, args: Vec<Operand> },
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Field(String),
    Text(String),
    Number(f64),
    Bool(bool),
    Group(Pipeline),
}

impl Operand {
    fn describe(&self) -> String {
        match self {
            Operand::Field(key) => format!("field .{}", key),
            Operand::Text(s) => format!("string {:?}", s),
            Operand::Number(n) => format!("number {}", n),
            Operand::Bool(b) => format!("{}", b),
            Operand::Group(_) => "parenthesized pipeline".to_string(),
        }
    }
}

// ============================================================================
// Template scanning
// ============================================================================

fn parse_template(source: &str) -> Result<Vec<Node>, String> {
    let mut nodes = Vec::new();
    let mut rest = source;
    let mut trim_next = false;

    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let trim_left = after_open.starts_with('-')
            && after_open[1..].starts_with(|c: char| c.is_whitespace());
        push_text(&mut nodes, &rest[..start], trim_next, trim_left);

        let line = line_at(source, source.len() - after_open.len());
        let inner = if trim_left { &after_open[1..] } else { after_open };
        let action = split_action(inner).map_err(|msg| format!("line {}: {}", line, msg))?;

        if let Some(body) = action.body {
            let pipeline = parse_action(body).map_err(|msg| format!("line {}: {}", line, msg))?;
            nodes.push(Node::Action { line, pipeline });
        }

        trim_next = action.trim_right;
        rest = action.rest;
    }

    push_text(&mut nodes, rest, trim_next, false);
    Ok(nodes)
}

fn push_text(nodes: &mut Vec<Node>, text: &str, trim_start: bool, trim_end: bool) {
    let mut text = text;
    if trim_start {
        text = text.trim_start();
    }
    if trim_end {
        text = text.trim_end();
    }
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

struct Action<'a> {
    /// `None` for comments.
    body: Option<&'a str>,
    trim_right: bool,
    rest: &'a str,
}

/// Splits the text after `{{` into the action body and the remainder.
fn split_action(inner: &str) -> Result<Action<'_>, String> {
    let trimmed = inner.trim_start();
    if let Some(comment) = trimmed.strip_prefix("/*") {
        let end = comment.find("*/").ok_or("unclosed comment")?;
        let after = &comment[end + 2..];
        let close = after.trim_start();
        let had_space = close.len() != after.len();
        return if let Some(rest) = close.strip_prefix("-}}").filter(|_| had_space) {
            Ok(Action {
                body: None,
                trim_right: true,
                rest,
            })
        } else if let Some(rest) = close.strip_prefix("}}") {
            Ok(Action {
                body: None,
                trim_right: false,
                rest,
            })
        } else {
            Err("comment ends before closing delimiter".to_string())
        };
    }

    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in inner.char_indices() {
        match quote {
            Some('"') if escaped => escaped = false,
            Some('"') if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '`' => quote = Some(c),
            None if inner[i..].starts_with("}}") => {
                let body = &inner[..i];
                let rest = &inner[i + 2..];
                let trim_right = body.ends_with('-')
                    && body[..body.len() - 1].ends_with(|c: char| c.is_whitespace());
                let body = if trim_right {
                    &body[..body.len() - 1]
                } else {
                    body
                };
                return Ok(Action {
                    body: Some(body),
                    trim_right,
                    rest,
                });
            }
            None => {}
        }
    }

    match quote {
        Some('`') => Err("unterminated raw quoted string".to_string()),
        Some(_) => Err("unterminated quoted string".to_string()),
        None => Err("unclosed action".to_string()),
    }
}

// ============================================================================
// Action lexing
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Field(String),
    Ident(String),
    Text(String),
    Number(f64),
    Pipe,
    Open,
    Close,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(body: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = body.char_indices().peekable();

    while let Some(&(i, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '|' => {
                chars.next();
                tokens.push(Token::Pipe);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '.' if body[i + 1..].starts_with(|c: char| c.is_ascii_digit()) => {
                tokens.push(lex_number(body, &mut chars)?);
            }
            '.' => {
                chars.next();
                let start = i + 1;
                let mut end = start;
                while let Some(&(j, c)) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    end = j + c.len_utf8();
                    chars.next();
                }
                if end == start {
                    return Err("bare '.' is not supported; reference a field as .key".to_string());
                }
                if body[end..].starts_with('.') {
                    return Err(format!(
                        "nested field access .{}.… is not supported",
                        &body[start..end]
                    ));
                }
                tokens.push(Token::Field(body[start..end].to_string()));
            }
            '"' => {
                chars.next();
                tokens.push(Token::Text(lex_quoted(&mut chars)?));
            }
            '`' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '`' {
                        closed = true;
                        break;
                    }
                    text.push(c);
                }
                if !closed {
                    return Err("unterminated raw quoted string".to_string());
                }
                tokens.push(Token::Text(text));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                tokens.push(lex_number(body, &mut chars)?);
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = i;
                while let Some(&(j, c)) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    end = j + c.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Ident(body[i..end].to_string()));
            }
            other => return Err(format!("unexpected {:?} in action", other)),
        }
    }

    Ok(tokens)
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn lex_number(body: &str, chars: &mut Chars<'_>) -> Result<Token, String> {
    let Some(&(start, _)) = chars.peek() else {
        return Err("expected number".to_string());
    };
    let mut end = start;
    let mut prev = ' ';
    while let Some(&(j, c)) = chars.peek() {
        let sign_in_exponent = (c == '-' || c == '+') && (j == start || matches!(prev, 'e' | 'E'));
        if !(c.is_ascii_alphanumeric() || c == '.' || c == '_' || sign_in_exponent) {
            break;
        }
        prev = c;
        end = j + c.len_utf8();
        chars.next();
    }
    let literal = &body[start..end];
    literal
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(Token::Number)
        .ok_or_else(|| format!("bad number syntax: {:?}", literal))
}

fn lex_quoted(chars: &mut Chars<'_>) -> Result<String, String> {
    let mut text = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(text),
            '\\' => {
                let Some((_, escape)) = chars.next() else {
                    break;
                };
                text.push(match escape {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    other => return Err(format!("unknown escape sequence \\{}", other)),
                });
            }
            c => text.push(c),
        }
    }
    Err("unterminated quoted string".to_string())
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_action(body: &str) -> Result<Pipeline, String> {
    let tokens = tokenize(body)?;
    let mut parser = Parser { tokens, pos: 0 };
    let pipeline = parser.pipeline()?;
    match parser.peek() {
        None => Ok(pipeline),
        Some(Token::Close) => Err("unexpected ')'".to_string()),
        Some(other) => Err(format!("unexpected {:?} in action", other)),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn at_command_end(&self) -> bool {
        matches!(self.peek(), None | Some(Token::Pipe) | Some(Token::Close))
    }

    fn pipeline(&mut self) -> Result<Pipeline, String> {
        let mut stages = Vec::new();
        loop {
            let piped = !stages.is_empty();
            let command = self.command()?;
            match &command {
                Command::Call { helper, args } => {
                    let given = args.len() + usize::from(piped);
                    if given != helper.arity() {
                        return Err(format!(
                            "wrong number of args for {}: want {} got {}",
                            helper.name(),
                            helper.arity(),
                            given
                        ));
                    }
                }
                Command::Operand(operand) if piped => {
                    return Err(format!("cannot pipe into {}: not a helper", operand.describe()));
                }
                Command::Operand(_) => {}
            }
            stages.push(command);

            if matches!(self.peek(), Some(Token::Pipe)) {
                self.pos += 1;
            } else {
                return Ok(Pipeline { stages });
            }
        }
    }

    fn command(&mut self) -> Result<Command, String> {
        if self.at_command_end() {
            return Err("missing value for command".to_string());
        }

        if let Some(Token::Ident(name)) = self.peek() {
            if let Some(helper) = Helper::from_name(name) {
                self.pos += 1;
                let mut args = Vec::new();
                while !self.at_command_end() {
                    args.push(self.operand()?);
                }
                return Ok(Command::Call { helper, args });
            }
        }

        let operand = self.operand()?;
        if !self.at_command_end() {
            return Err(format!("{} takes no arguments", operand.describe()));
        }
        Ok(Command::Operand(operand))
    }

    fn operand(&mut self) -> Result<Operand, String> {
        match self.next() {
            Some(Token::Field(key)) => Ok(Operand::Field(key)),
            Some(Token::Text(s)) => Ok(Operand::Text(s)),
            Some(Token::Number(n)) => Ok(Operand::Number(n)),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Operand::Bool(true)),
                "false" => Ok(Operand::Bool(false)),
                kw if KEYWORDS.contains(&kw) => {
                    Err(format!("control keyword {:?} is not supported", kw))
                }
                other if Helper::from_name(other).is_some() => Err(format!(
                    "helper {:?} used as an argument must be parenthesized",
                    other
                )),
                other => Err(format!("function {:?} not defined", other)),
            },
            Some(Token::Open) => {
                let inner = self.pipeline()?;
                match self.next() {
                    Some(Token::Close) => Ok(Operand::Group(inner)),
                    _ => Err("unclosed left paren".to_string()),
                }
            }
            Some(Token::Close) => Err("unexpected ')'".to_string()),
            Some(Token::Pipe) | None => Err("missing value for command".to_string()),
        }
    }
}

// ============================================================================
// Evaluation
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Value {
    fn write_to(&self, out: &mut String) {
        match self {
            Value::Text(s) => out.push_str(s),
            Value::Number(n) => out.push_str(&n.to_string()),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        }
    }

    fn into_arg(self) -> Arg {
        match self {
            Value::Text(s) => Arg::text(s),
            Value::Number(n) => Arg::number(n),
            Value::Bool(b) => Arg::text(b.to_string()),
        }
    }
}

fn eval_pipeline(pipeline: &Pipeline, data: &FieldData, log: &FallbackLog) -> Result<Value, String> {
    let mut previous: Option<Value> = None;
    for stage in &pipeline.stages {
        let value = match stage {
            Command::Operand(operand) => eval_operand(operand, data, log)?,
            Command::Call { helper, args } => {
                let mut values = args
                    .iter()
                    .map(|arg| eval_operand(arg, data, log).map(Value::into_arg))
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(piped) = previous.take() {
                    values.push(piped.into_arg());
                }
                Value::Text(helper.apply(&values, log)?)
            }
        };
        previous = Some(value);
    }
    Ok(previous.unwrap_or_else(|| Value::Text(String::new())))
}

fn eval_operand(operand: &Operand, data: &FieldData, log: &FallbackLog) -> Result<Value, String> {
    Ok(match operand {
        Operand::Field(key) => Value::Text(data.get(key).cloned().unwrap_or_default()),
        Operand::Text(s) => Value::Text(s.clone()),
        Operand::Number(n) => Value::Number(*n),
        Operand::Bool(b) => Value::Bool(*b),
        Operand::Group(inner) => eval_pipeline(inner, data, log)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FieldData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn render(source: &str, values: &[(&str, &str)]) -> Result<String, RenderError> {
        let mut engine = ActionEngine::new(FallbackLog::new());
        engine.add_template("t", source)?;
        engine.render_named("t", &data(values))
    }

    fn compile_error(source: &str) -> String {
        let mut engine = ActionEngine::new(FallbackLog::new());
        match engine.add_template("t", source) {
            Err(RenderError::Syntax { message, .. }) => message,
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_field_substitution() {
        assert_eq!(render("{{.bg}}", &[("bg", "#112233")]).unwrap(), "#112233");
        assert_eq!(
            render("bg={{ .bg }} fg={{.fg}}", &[("bg", "#000"), ("fg", "#fff")]).unwrap(),
            "bg=#000 fg=#fff"
        );
    }

    #[test]
    fn test_missing_field_renders_empty() {
        assert_eq!(render("[{{.nope}}]", &[]).unwrap(), "[]");
    }

    #[test]
    fn test_text_without_actions() {
        assert_eq!(render("plain } { text", &[]).unwrap(), "plain } { text");
        assert_eq!(render("", &[]).unwrap(), "");
    }

    #[test]
    fn test_helper_calls() {
        let values = [("bg", "#808080"), ("fg", "#ffffff"), ("opacity", "0.8")];
        assert_eq!(render("{{brighten .bg 0.3}}", &values).unwrap(), "#a6a6a6");
        assert_eq!(
            render(r##"{{mix "#000000" .fg 0.5}}"##, &values).unwrap(),
            "#7f7f7f"
        );
        assert_eq!(
            render("{{alpha .fg .opacity}}", &values).unwrap(),
            "rgba(255,255,255,0.8)"
        );
        assert_eq!(render("{{hexToRGBA .fg 1}}", &values).unwrap(), "rgba(255,255,255,1.0)");
        assert_eq!(
            render("{{colorFormat .bg `hex_0x`}}", &values).unwrap(),
            "0x808080"
        );
    }

    #[test]
    fn test_pipes_append_last_argument() {
        let values = [("bg", "#808080")];
        assert_eq!(render("{{0.3 | brighten .bg}}", &values).unwrap(), "#a6a6a6");
        assert_eq!(
            render(r##"{{"ff" | trimSuffix "#808080ff"}}"##, &values).unwrap(),
            "#808080"
        );
        assert_eq!(
            render(r##"{{"#" | trimPrefix (brighten .bg 0.3)}}"##, &values).unwrap(),
            "a6a6a6"
        );
    }

    #[test]
    fn test_parenthesized_pipeline() {
        let values = [("bg", "#000000"), ("fg", "#ffffff")];
        assert_eq!(
            render(r#"{{colorFormat (mix .bg .fg 0.5) "rgb"}}"#, &values).unwrap(),
            "rgb(127, 127, 127)"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(render(r#"{{"a\tb\"c"}}"#, &[]).unwrap(), "a\tb\"c");
        assert_eq!(render("{{`raw \\n`}}", &[]).unwrap(), "raw \\n");
        assert_eq!(render("{{1.5}} {{-2}} {{true}}", &[]).unwrap(), "1.5 -2 true");
    }

    #[test]
    fn test_trim_markers() {
        assert_eq!(render("a  {{- .x -}}  b", &[("x", "X")]).unwrap(), "aXb");
        assert_eq!(render("a\n{{- .x}}\n", &[("x", "X")]).unwrap(), "aX\n");
        assert_eq!(render("{{-3}}", &[]).unwrap(), "-3");
    }

    #[test]
    fn test_comments() {
        assert_eq!(render("a{{/* note }} */}}b", &[]).unwrap(), "ab");
        assert_eq!(render("a\n{{- /* note */ -}}\nb", &[]).unwrap(), "ab");
        assert!(compile_error("{{/* open").contains("unclosed comment"));
    }

    #[test]
    fn test_braces_inside_strings() {
        assert_eq!(render(r#"{{"}}"}}"#, &[]).unwrap(), "}}");
    }

    #[test]
    fn test_compile_errors() {
        assert!(compile_error("{{.bg").contains("unclosed action"));
        assert!(compile_error(r#"{{"open}}"#).contains("unterminated quoted string"));
        assert!(compile_error("{{printf .bg}}").contains("not defined"));
        assert!(compile_error("{{.bg 0.5}}").contains("field .bg takes no arguments"));
        assert!(compile_error("{{if .bg}}x{{end}}").contains("control keyword"));
        assert!(compile_error("{{range .x}}").contains("control keyword"));
        assert!(compile_error("{{}}").contains("missing value"));
        assert!(compile_error("{{mix .a .b}}").contains("want 3 got 2"));
        assert!(compile_error("{{.a | .b}}").contains("not a helper"));
        assert!(compile_error("{{.a.b}}").contains("nested field access"));
        assert!(compile_error("{{(brighten .a 0.1}}").contains("unclosed left paren"));
    }

    #[test]
    fn test_error_reports_line() {
        let msg = compile_error("line one\nline two {{nope}}\n");
        assert!(msg.starts_with("line 2:"), "{}", msg);
    }

    #[test]
    fn test_runtime_error_for_non_numeric_amount() {
        let err = render("{{brighten .bg .amount}}", &[("bg", "#000000"), ("amount", "lots")])
            .unwrap_err();
        match err {
            RenderError::Execution { message, .. } => {
                assert!(message.starts_with("line 1:"));
                assert!(message.contains("must be a number"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_fallback_recorded() {
        let log = FallbackLog::new();
        let mut engine = ActionEngine::new(log.clone());
        engine.add_template("t", "{{brighten .bg 0.5}}").unwrap();
        let out = engine.render_named("t", &data(&[("bg", "not-a-color")])).unwrap();
        assert_eq!(out, "not-a-color");
        assert_eq!(log.take().len(), 1);
    }

    #[test]
    fn test_has_template() {
        let mut engine = ActionEngine::new(FallbackLog::new());
        assert!(!engine.has_template("t"));
        engine.add_template("t", "{{.bg}}").unwrap();
        assert!(engine.has_template("t"));
    }
}
