//! Row filter expressions for the "Custom Query" analysis.
//!
//! The grammar is closed: column references, literals,
//! arithmetic, comparisons (chainable), membership in a literal list and the
//! boolean connectives. Nothing else parses, so an expression can only ever
//! read cells.
//!
//! ```text
//! Salary > 70000 and Age < 40
//! `Start Date` == '2024-01-01' or not Remote
//! 30 <= Age < 50 & Department in ['Sales', 'HR']
//! ```

use logos::Logos;
use nom::{
    branch::alt,
    combinator::{cut, map, opt},
    error::{ErrorKind, ParseError},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded},
    Err, IResult,
};

use crate::error::QueryError;

use super::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token {
    #[token("and")]
    #[token("&")]
    And,

    #[token("or")]
    #[token("|")]
    Or,

    #[token("not")]
    #[token("~")]
    Not,

    #[token("in")]
    In,

    #[token("True")]
    True,

    #[token("False")]
    False,

    #[token("==")]
    Eq,

    #[token("!=")]
    Ne,

    #[token("<")]
    Lt,

    #[token("<=")]
    Le,

    #[token(">")]
    Gt,

    #[token(">=")]
    Ge,

    #[token("=")]
    Assign,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unquote(lex.slice()))]
    Str(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    #[regex(r"`[^`]*`", |lex| lex.slice().trim_matches('`').to_string())]
    Name(String),
}

/// Strip the surrounding quotes and resolve backslash escapes.
fn unquote(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, QueryError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push((token, span.start)),
            Err(()) => {
                return Err(QueryError::Syntax {
                    position: span.start,
                    message: format!("unexpected '{}'", &source[span]),
                })
            }
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Expression tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn test(self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ord == Equal,
            CompareOp::Ne => ord != Equal,
            CompareOp::Lt => ord == Less,
            CompareOp::Le => ord != Greater,
            CompareOp::Gt => ord == Greater,
            CompareOp::Ge => ord != Less,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }
}

/// A filter expression tree. The parser produces `Expr<String>` with column
/// names as written; [`Query::parse`] resolves them to column indices.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<C = usize> {
    Column(C),
    Literal(Value),
    Neg(Box<Expr<C>>),
    Not(Box<Expr<C>>),
    Arith {
        op: ArithOp,
        left: Box<Expr<C>>,
        right: Box<Expr<C>>,
    },
    Compare {
        op: CompareOp,
        left: Box<Expr<C>>,
        right: Box<Expr<C>>,
    },
    In {
        expr: Box<Expr<C>>,
        list: Vec<Value>,
        negated: bool,
    },
    And(Box<Expr<C>>, Box<Expr<C>>),
    Or(Box<Expr<C>>, Box<Expr<C>>),
}

impl Expr<String> {
    /// Replace every column name with its index, failing on the first unknown name.
    fn resolve(self, dataset: &Dataset) -> Result<Expr, QueryError> {
        let sub = |e: Box<Expr<String>>| e.resolve(dataset).map(Box::new);
        Ok(match self {
            Expr::Column(name) => match dataset.column_index(&name) {
                Some(idx) => Expr::Column(idx),
                None => return Err(QueryError::UnknownColumn(name)),
            },
            Expr::Literal(v) => Expr::Literal(v),
            Expr::Neg(e) => Expr::Neg(sub(e)?),
            Expr::Not(e) => Expr::Not(sub(e)?),
            Expr::Arith { op, left, right } => Expr::Arith {
                op,
                left: sub(left)?,
                right: sub(right)?,
            },
            Expr::Compare { op, left, right } => Expr::Compare {
                op,
                left: sub(left)?,
                right: sub(right)?,
            },
            Expr::In {
                expr,
                list,
                negated,
            } => Expr::In {
                expr: sub(expr)?,
                list,
                negated,
            },
            Expr::And(l, r) => Expr::And(sub(l)?, sub(r)?),
            Expr::Or(l, r) => Expr::Or(sub(l)?, sub(r)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parser input is a slice of tokens with their byte offsets.
type TokenSlice<'a> = &'a [(Token, usize)];

type PResult<'a, T> = IResult<TokenSlice<'a>, T, SyntaxError<'a>>;

/// Where parsing stopped and what was expected there.
#[derive(Debug)]
struct SyntaxError<'a> {
    input: TokenSlice<'a>,
    message: &'static str,
}

impl<'a> ParseError<TokenSlice<'a>> for SyntaxError<'a> {
    fn from_error_kind(input: TokenSlice<'a>, _: ErrorKind) -> Self {
        let message = if input.is_empty() {
            "unexpected end of expression"
        } else {
            "unexpected token"
        };
        SyntaxError { input, message }
    }

    fn append(_: TokenSlice<'a>, _: ErrorKind, other: Self) -> Self {
        other
    }
}

fn fail<'a, T>(input: TokenSlice<'a>, message: &'static str) -> PResult<'a, T> {
    Err(Err::Error(SyntaxError { input, message }))
}

/// Parse a specific token
fn token<'a>(tok: Token) -> impl Fn(TokenSlice<'a>) -> PResult<'a, &'a Token> {
    move |input: TokenSlice<'a>| match input.split_first() {
        Some(((found, _), rest)) if *found == tok => Ok((rest, found)),
        _ => Err(Err::Error(SyntaxError::from_error_kind(input, ErrorKind::Tag))),
    }
}

/// A token that must be present; anything else is a hard failure.
fn expect<'a>(tok: Token, message: &'static str) -> impl Fn(TokenSlice<'a>) -> PResult<'a, ()> {
    move |input: TokenSlice<'a>| match input.split_first() {
        Some(((found, _), rest)) if *found == tok => Ok((rest, ())),
        _ => Err(Err::Failure(SyntaxError { input, message })),
    }
}

fn or_expr(input: TokenSlice) -> PResult<Expr<String>> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(token(Token::Or), cut(and_expr)))(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |l, r| Expr::Or(Box::new(l), Box::new(r)));
    Ok((input, expr))
}

fn and_expr(input: TokenSlice) -> PResult<Expr<String>> {
    let (input, first) = not_expr(input)?;
    let (input, rest) = many0(preceded(token(Token::And), cut(not_expr)))(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |l, r| Expr::And(Box::new(l), Box::new(r)));
    Ok((input, expr))
}

fn not_expr(input: TokenSlice) -> PResult<Expr<String>> {
    alt((
        map(preceded(token(Token::Not), cut(not_expr)), |e| {
            Expr::Not(Box::new(e))
        }),
        comparison,
    ))(input)
}

fn compare_op(input: TokenSlice) -> PResult<CompareOp> {
    alt((
        map(token(Token::Eq), |_| CompareOp::Eq),
        map(token(Token::Ne), |_| CompareOp::Ne),
        map(token(Token::Lt), |_| CompareOp::Lt),
        map(token(Token::Le), |_| CompareOp::Le),
        map(token(Token::Gt), |_| CompareOp::Gt),
        map(token(Token::Ge), |_| CompareOp::Ge),
    ))(input)
}

/// `a < b <= c` becomes `(a < b) and (b <= c)`; an optional `in` / `not in`
/// list test applies to the whole comparison.
fn comparison(input: TokenSlice) -> PResult<Expr<String>> {
    let (input, first) = additive(input)?;
    let (input, links) = many0(pair(compare_op, cut(additive)))(input)?;

    let mut left = first;
    let mut chain: Option<Expr<String>> = None;
    for (op, right) in links {
        let link = Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right.clone()),
        };
        chain = Some(match chain {
            Some(prev) => Expr::And(Box::new(prev), Box::new(link)),
            None => link,
        });
        left = right;
    }
    let base = chain.unwrap_or(left);

    if let Some((Token::Assign, _)) = input.first() {
        return Err(Err::Failure(SyntaxError {
            input,
            message: "'=' is assignment; use '==' to compare",
        }));
    }

    let membership = alt((
        map(pair(token(Token::Not), token(Token::In)), |_| true),
        map(token(Token::In), |_| false),
    ));
    let (input, test) = opt(pair(membership, cut(list)))(input)?;
    let expr = match test {
        Some((negated, list)) => Expr::In {
            expr: Box::new(base),
            list,
            negated,
        },
        None => base,
    };
    Ok((input, expr))
}

fn list(input: TokenSlice) -> PResult<Vec<Value>> {
    delimited(
        expect(Token::LBracket, "expected '[' to start a list"),
        separated_list0(token(Token::Comma), literal),
        expect(Token::RBracket, "expected ',' or ']'"),
    )(input)
}

fn literal_value(tok: &Token) -> Option<Value> {
    match tok {
        Token::Int(i) => Some(Value::Int(*i)),
        Token::Float(f) => Some(Value::Float(*f)),
        Token::Str(s) => Some(Value::Text(s.clone())),
        Token::True => Some(Value::Bool(true)),
        Token::False => Some(Value::Bool(false)),
        _ => None,
    }
}

/// A list item: a literal, numbers optionally negated.
fn literal(input: TokenSlice) -> PResult<Value> {
    let (input, minus) = opt(token(Token::Minus))(input)?;
    let Some(((tok, _), rest)) = input.split_first() else {
        return fail(input, "unexpected end of expression");
    };
    let value = match (literal_value(tok), minus.is_some()) {
        (Some(Value::Int(i)), true) => Value::Int(-i),
        (Some(Value::Float(f)), true) => Value::Float(-f),
        (Some(v), false) => v,
        _ => return fail(input, "expected a literal value"),
    };
    Ok((rest, value))
}

fn fold_arith(first: Expr<String>, rest: Vec<(ArithOp, Expr<String>)>) -> Expr<String> {
    rest.into_iter().fold(first, |left, (op, right)| Expr::Arith {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn additive(input: TokenSlice) -> PResult<Expr<String>> {
    let op = alt((
        map(token(Token::Plus), |_| ArithOp::Add),
        map(token(Token::Minus), |_| ArithOp::Sub),
    ));
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(op, cut(term)))(input)?;
    Ok((input, fold_arith(first, rest)))
}

fn term(input: TokenSlice) -> PResult<Expr<String>> {
    let op = alt((
        map(token(Token::Star), |_| ArithOp::Mul),
        map(token(Token::Slash), |_| ArithOp::Div),
        map(token(Token::Percent), |_| ArithOp::Rem),
    ));
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(op, cut(unary)))(input)?;
    Ok((input, fold_arith(first, rest)))
}

fn unary(input: TokenSlice) -> PResult<Expr<String>> {
    alt((
        map(preceded(token(Token::Minus), cut(unary)), |e| {
            Expr::Neg(Box::new(e))
        }),
        primary,
    ))(input)
}

fn primary(input: TokenSlice) -> PResult<Expr<String>> {
    let Some(((tok, _), rest)) = input.split_first() else {
        return fail(input, "unexpected end of expression");
    };
    match tok {
        Token::Name(name) => Ok((rest, Expr::Column(name.clone()))),
        Token::LParen => {
            let (rest, inner) = cut(or_expr)(rest)?;
            let (rest, _) = expect(Token::RParen, "expected ')'")(rest)?;
            Ok((rest, inner))
        }
        other => match literal_value(other) {
            Some(v) => Ok((rest, Expr::Literal(v))),
            None => fail(input, "expected a column, a value or '('"),
        },
    }
}

// ---------------------------------------------------------------------------
// Compiled query
// ---------------------------------------------------------------------------

/// A filter expression checked against one dataset's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    expr: Expr,
}

impl Query {
    /// Parse `source` and resolve every column name against `dataset`.
    pub fn parse(source: &str, dataset: &Dataset) -> Result<Self, QueryError> {
        let tokens = tokenize(source)?;
        let syntax = |at: TokenSlice, message: &str| QueryError::Syntax {
            position: at.first().map_or(source.len(), |(_, pos)| *pos),
            message: message.to_string(),
        };

        let expr = match or_expr(&tokens) {
            Ok(([], expr)) => expr,
            Ok((rest, _)) => return Err(syntax(rest, "unexpected trailing input")),
            Err(Err::Error(e) | Err::Failure(e)) => return Err(syntax(e.input, e.message)),
            Err(Err::Incomplete(_)) => {
                return Err(QueryError::Syntax {
                    position: source.len(),
                    message: "unexpected end of expression".to_string(),
                })
            }
        };
        Ok(Self {
            expr: expr.resolve(dataset)?,
        })
    }

    /// Indices of the rows for which the expression is `True`.
    pub fn matching_rows(&self, dataset: &Dataset) -> Result<Vec<usize>, QueryError> {
        let mut rows = Vec::new();
        for row in 0..dataset.row_count() {
            match eval(&self.expr, dataset, row)? {
                Value::Bool(true) => rows.push(row),
                Value::Bool(false) => {}
                other => return Err(QueryError::NotBoolean(other.type_name(), row)),
            }
        }
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

fn eval(expr: &Expr, dataset: &Dataset, row: usize) -> Result<Value, QueryError> {
    match expr {
        Expr::Column(col) => Ok(dataset.cell(row, *col).clone()),
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Neg(inner) => match eval(inner, dataset, row)? {
            Value::Int(i) => Ok(i.checked_neg().map_or(Value::Float(-(i as f64)), Value::Int)),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Missing => Ok(Value::Missing),
            other => Err(mismatch("-", &other, &other)),
        },
        Expr::Not(inner) => match eval(inner, dataset, row)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(mismatch("not", &other, &other)),
        },
        Expr::Arith { op, left, right } => {
            let l = eval(left, dataset, row)?;
            let r = eval(right, dataset, row)?;
            arith(*op, &l, &r)
        }
        Expr::Compare { op, left, right } => {
            let l = eval(left, dataset, row)?;
            let r = eval(right, dataset, row)?;
            compare(*op, &l, &r).map(Value::Bool)
        }
        Expr::In {
            expr,
            list,
            negated,
        } => {
            let v = eval(expr, dataset, row)?;
            let mut found = false;
            for item in list {
                if compare(CompareOp::Eq, &v, item)? {
                    found = true;
                    break;
                }
            }
            Ok(Value::Bool(found != *negated))
        }
        Expr::And(left, right) => {
            let l = expect_bool("and", eval(left, dataset, row)?)?;
            if !l {
                return Ok(Value::Bool(false));
            }
            expect_bool("and", eval(right, dataset, row)?).map(Value::Bool)
        }
        Expr::Or(left, right) => {
            let l = expect_bool("or", eval(left, dataset, row)?)?;
            if l {
                return Ok(Value::Bool(true));
            }
            expect_bool("or", eval(right, dataset, row)?).map(Value::Bool)
        }
    }
}

fn mismatch(op: &str, left: &Value, right: &Value) -> QueryError {
    QueryError::TypeMismatch {
        op: op.to_string(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn expect_bool(op: &str, v: Value) -> Result<bool, QueryError> {
    match v {
        Value::Bool(b) => Ok(b),
        other => Err(mismatch(op, &other, &other)),
    }
}

fn is_number(v: &Value) -> bool {
    matches!(v, Value::Int(_) | Value::Float(_) | Value::Bool(_))
}

/// Missing operands never compare equal to anything, so only `!=` holds.
fn compare(op: CompareOp, l: &Value, r: &Value) -> Result<bool, QueryError> {
    match (l, r) {
        (Value::Missing, _) | (_, Value::Missing) => Ok(op == CompareOp::Ne),
        (Value::Int(a), Value::Int(b)) => Ok(op.test(a.cmp(b))),
        (Value::Text(a), Value::Text(b)) => Ok(op.test(a.cmp(b))),
        (a, b) if is_number(a) && is_number(b) => {
            let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
            Ok(match x.partial_cmp(&y) {
                Some(ord) => op.test(ord),
                None => op == CompareOp::Ne,
            })
        }
        (a, b) => match op {
            CompareOp::Eq => Ok(false),
            CompareOp::Ne => Ok(true),
            _ => Err(mismatch(op.symbol(), a, b)),
        },
    }
}

fn arith(op: ArithOp, l: &Value, r: &Value) -> Result<Value, QueryError> {
    match (l, r) {
        (Value::Missing, Value::Missing) => Ok(Value::Missing),
        (Value::Missing, v) | (v, Value::Missing) if is_number(v) => Ok(Value::Missing),
        (Value::Int(a), Value::Int(b)) if op != ArithOp::Div => {
            let exact = match op {
                ArithOp::Add => a.checked_add(*b),
                ArithOp::Sub => a.checked_sub(*b),
                ArithOp::Mul => a.checked_mul(*b),
                ArithOp::Rem => a.checked_rem(*b).map(|r| {
                    if r != 0 && (r < 0) != (*b < 0) {
                        r + b
                    } else {
                        r
                    }
                }),
                ArithOp::Div => None,
            };
            Ok(exact.map_or_else(|| float_arith(op, *a as f64, *b as f64), Value::Int))
        }
        (a, b) if is_number(a) && is_number(b) => Ok(float_arith(
            op,
            a.as_f64().unwrap_or(f64::NAN),
            b.as_f64().unwrap_or(f64::NAN),
        )),
        (a, b) => Err(mismatch(op.symbol(), a, b)),
    }
}

fn float_arith(op: ArithOp, a: f64, b: f64) -> Value {
    Value::Float(match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        // Floored: the result takes the sign of the divisor.
        ArithOp::Rem => a - b * (a / b).floor(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{parse_bytes, LoadOptions};

    fn people() -> Dataset {
        let csv = "Name,Age,Salary,Dept,Remote,Start Date\n\
                   Ann,34,82000,Sales,True,2020-01-05\n\
                   Bob,45,65000,HR,False,2018-03-01\n\
                   Cid,29,71000,Sales,False,2022-07-11\n\
                   Dee,52,,IT,True,2015-09-30\n";
        parse_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap()
    }

    fn rows(expr: &str) -> Result<Vec<usize>, QueryError> {
        let ds = people();
        Query::parse(expr, &ds)?.matching_rows(&ds)
    }

    #[test]
    fn comparison_with_boolean_connectives() {
        assert_eq!(rows("Salary > 70000 and Age < 40").unwrap(), vec![0, 2]);
        assert_eq!(rows("Age > 50 or Dept == 'HR'").unwrap(), vec![1, 3]);
        assert_eq!(rows("Age > 30 & ~(Dept == \"Sales\")").unwrap(), vec![1, 3]);
    }

    #[test]
    fn missing_cells_only_satisfy_not_equal() {
        assert_eq!(rows("Salary < 1000000").unwrap(), vec![0, 1, 2]);
        assert_eq!(rows("Salary != 65000").unwrap(), vec![0, 2, 3]);
    }

    #[test]
    fn chained_comparison_and_arithmetic() {
        assert_eq!(rows("30 <= Age < 50").unwrap(), vec![0, 1]);
        assert_eq!(rows("Salary / 1000 >= 71").unwrap(), vec![0, 2]);
        assert_eq!(rows("Age * 2 - 10 == 48").unwrap(), vec![2]);
    }

    #[test]
    fn membership_lists_and_backticks() {
        assert_eq!(rows("Dept in ['HR', 'IT']").unwrap(), vec![1, 3]);
        assert_eq!(rows("Dept not in ['HR', 'IT']").unwrap(), vec![0, 2]);
        assert_eq!(rows("`Start Date` < '2019-01-01'").unwrap(), vec![1, 3]);
    }

    #[test]
    fn boolean_columns_stand_alone() {
        assert_eq!(rows("Remote").unwrap(), vec![0, 3]);
        assert_eq!(rows("not Remote and Age < 30").unwrap(), vec![2]);
        assert_eq!(rows("Remote == True").unwrap(), vec![0, 3]);
    }

    #[test]
    fn unknown_column_is_reported_by_name() {
        assert_eq!(
            rows("Bonus > 3"),
            Err(QueryError::UnknownColumn("Bonus".to_string()))
        );
    }

    #[test]
    fn syntax_errors_carry_a_position() {
        assert!(matches!(rows("Age >"), Err(QueryError::Syntax { position: 5, .. })));
        assert!(matches!(rows("Age = 3"), Err(QueryError::Syntax { position: 4, .. })));
        assert!(matches!(rows("Age > 3 )"), Err(QueryError::Syntax { .. })));
        assert!(matches!(rows("Age ! 3"), Err(QueryError::Syntax { position: 4, .. })));
    }

    #[test]
    fn ordering_text_against_numbers_is_a_type_error() {
        assert!(matches!(rows("Dept > 3"), Err(QueryError::TypeMismatch { .. })));
        assert_eq!(rows("Dept == 3").unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn non_boolean_results_are_rejected() {
        assert!(matches!(rows("Age + 1"), Err(QueryError::NotBoolean("int", 0))));
        assert!(matches!(rows("Age and Remote"), Err(QueryError::TypeMismatch { .. })));
    }

    #[test]
    fn syntax_error_messages() {
        let message = |expr: &str| match rows(expr) {
            Err(QueryError::Syntax { message, .. }) => message,
            other => panic!("expected a syntax error, got {other:?}"),
        };
        assert_eq!(message("Age = 3"), "'=' is assignment; use '==' to compare");
        assert_eq!(message("(Age > 3"), "expected ')'");
        assert_eq!(message("Dept in 'HR'"), "expected '[' to start a list");
        assert_eq!(message("Age > 3 )"), "unexpected trailing input");
    }

    #[test]
    fn function_calls_do_not_parse() {
        assert!(matches!(rows("len(Name) > 2"), Err(QueryError::Syntax { position: 3, .. })));
        assert!(matches!(rows("Name.str.len() > 2"), Err(QueryError::Syntax { .. })));
    }

    #[test]
    fn syntax_is_checked_before_column_names() {
        assert!(matches!(rows("Bonus >"), Err(QueryError::Syntax { position: 7, .. })));
    }

    #[test]
    fn missing_operand_propagates_through_arithmetic() {
        assert_eq!(rows("Salary + 1 > 0").unwrap(), vec![0, 1, 2]);
        assert_eq!(rows("-Salary < 0").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn modulo_takes_the_sign_of_the_divisor() {
        assert_eq!(rows("Age % 2 == 0").unwrap(), vec![0, 3]);
        assert_eq!(rows("Age % -5 == -1").unwrap(), vec![0, 2]);
        assert_eq!(rows("-Age % 5 == 1").unwrap(), vec![0, 2]);
        assert_eq!(rows("7 % -3 == -2").unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(rows("-7 % 3 == 2").unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(rows("7.5 % -2 == -0.5").unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn negating_the_smallest_integer_does_not_overflow() {
        let ds = parse_bytes(b"A\n-9223372036854775808\n1\n", &LoadOptions::default()).unwrap();
        let query = Query::parse("-A > 0", &ds).unwrap();
        assert_eq!(query.matching_rows(&ds).unwrap(), vec![0]);
    }
}
