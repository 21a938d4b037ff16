use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{cut, opt, recognize},
    multi::{fold_many0, separated_list0},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use super::error::{EvalError, EvalResult};
use super::functions;

/// Unary signs and `^` recurse once each, so they get a larger allowance
/// than parentheses before an expression is rejected as too deep.
const CHAIN_FACTOR: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            BinOp::Div => lhs / rhs,
            BinOp::Rem => lhs % rhs,
            BinOp::Pow => lhs.powf(rhs),
        }
    }
}

// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Number(f64),
    Ident(String),
    Neg(Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
    Call(String, Vec<Node>),
}

impl Node {
    fn binary(op: BinOp, lhs: Node, rhs: Node) -> Self {
        Node::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Evaluate the tree with IEEE-754 semantics: division by zero yields an
    /// infinity and undefined operations yield NaN rather than an error.
    pub(crate) fn eval(&self) -> EvalResult<f64> {
        match self {
            Node::Number(value) => Ok(*value),
            Node::Ident(name) => functions::constant(name)
                .ok_or_else(|| EvalError::UnknownIdentifier(name.clone())),
            Node::Neg(operand) => Ok(-operand.eval()?),
            Node::Binary(op, lhs, rhs) => Ok(op.apply(lhs.eval()?, rhs.eval()?)),
            Node::Call(name, args) => {
                let values = args.iter().map(Node::eval).collect::<EvalResult<Vec<_>>>()?;
                functions::call(name, &values)
            }
        }
    }
}

// Integer and decimal part: 12, 12., 12.5, .5
fn mantissa(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ))(input)
}

// Scientific notation suffix: e3, E-2, e+10
fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

fn parse_number(input: &str) -> IResult<&str, Node> {
    let (rest, text) = recognize(pair(mantissa, opt(exponent)))(input)?;
    match text.parse::<f64>() {
        Ok(value) => Ok((rest, Node::Number(value))),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Float,
        ))),
    }
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

// Function call `name(arg, ...)` or a bare constant name.
// Once the opening parenthesis is seen the call is committed.
fn parse_call_or_ident(input: &str) -> IResult<&str, Node> {
    let (input, name) = parse_identifier(input)?;

    let open: IResult<&str, char> = preceded(multispace0, char('('))(input);
    let Ok((after_open, _)) = open else {
        return Ok((input, Node::Ident(name.to_string())));
    };

    let (rest, args) =
        separated_list0(preceded(multispace0, char(',')), parse_expr)(after_open)?;
    let (rest, _) = cut(preceded(multispace0, char(')')))(rest)?;
    Ok((rest, Node::Call(name.to_string(), args)))
}

fn parse_parens(input: &str) -> IResult<&str, Node> {
    delimited(
        char('('),
        parse_expr,
        cut(preceded(multispace0, char(')'))),
    )(input)
}

fn parse_atom(input: &str) -> IResult<&str, Node> {
    preceded(
        multispace0,
        alt((parse_number, parse_call_or_ident, parse_parens)),
    )(input)
}

// Power is right associative and its exponent may carry a sign: 2^3^2, 2^-1
fn parse_power(input: &str) -> IResult<&str, Node> {
    let (input, base) = parse_atom(input)?;

    let caret: IResult<&str, char> = preceded(multispace0, char('^'))(input);
    match caret {
        Ok((rest, _)) => {
            let (rest, exponent) = parse_unary(rest)?;
            Ok((rest, Node::binary(BinOp::Pow, base, exponent)))
        }
        Err(_) => Ok((input, base)),
    }
}

// Unary signs bind looser than `^`: -2^2 = -(2^2)
fn parse_unary(input: &str) -> IResult<&str, Node> {
    let sign: IResult<&str, char> = preceded(multispace0, one_of("+-"))(input);
    match sign {
        Ok((rest, '-')) => {
            let (rest, operand) = parse_unary(rest)?;
            Ok((rest, Node::Neg(Box::new(operand))))
        }
        Ok((rest, _)) => parse_unary(rest),
        Err(_) => parse_power(input),
    }
}

fn parse_term(input: &str) -> IResult<&str, Node> {
    let (input, init) = parse_unary(input)?;
    fold_many0(
        pair(preceded(multispace0, one_of("*/%")), parse_unary),
        move || init.clone(),
        |acc, (op, rhs)| {
            let op = match op {
                '*' => BinOp::Mul,
                '/' => BinOp::Div,
                _ => BinOp::Rem,
            };
            Node::binary(op, acc, rhs)
        },
    )(input)
}

fn parse_expr(input: &str) -> IResult<&str, Node> {
    let (input, init) = parse_term(input)?;
    fold_many0(
        pair(preceded(multispace0, one_of("+-")), parse_term),
        move || init.clone(),
        |acc, (op, rhs)| {
            let op = if op == '+' { BinOp::Add } else { BinOp::Sub };
            Node::binary(op, acc, rhs)
        },
    )(input)
}

/// 1-based character position of `rest` inside `expression`.
fn position_of(expression: &str, rest: &str) -> usize {
    let consumed = expression.len().saturating_sub(rest.len());
    expression[..consumed].chars().count() + 1
}

fn syntax_error(expression: &str, err: nom::Err<nom::error::Error<&str>>) -> EvalError {
    let rest = match &err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
        nom::Err::Incomplete(_) => "",
    };
    EvalError::Syntax {
        position: position_of(expression, rest),
    }
}

/// Reject inputs whose size or nesting would make the recursive descent
/// parser recurse too deeply.
pub(crate) fn check_limits(expression: &str, max_len: usize, max_nesting: usize) -> EvalResult<()> {
    if expression.chars().count() > max_len {
        return Err(EvalError::TooLong { max: max_len });
    }

    let too_deep = EvalError::TooDeep { max: max_nesting };
    let mut depth = 0usize;
    let mut chain = 0usize;
    let mut previous: Option<char> = None;

    for c in expression.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '(' => {
                depth += 1;
                if depth > max_nesting {
                    return Err(too_deep);
                }
            }
            ')' => depth = depth.saturating_sub(1),
            '^' => chain += 1,
            '+' | '-' if matches!(previous, None | Some('+' | '-' | '*' | '/' | '%' | '^' | '(' | ',')) => {
                chain += 1
            }
            _ => {}
        }
        if chain > max_nesting.saturating_mul(CHAIN_FACTOR) {
            return Err(too_deep);
        }
        previous = Some(c);
    }

    Ok(())
}

/// Parse a complete expression; trailing input is an error.
pub(crate) fn parse(expression: &str) -> EvalResult<Node> {
    if expression.trim().is_empty() {
        return Err(EvalError::Empty);
    }

    let (rest, node) = parse_expr(expression).map_err(|err| syntax_error(expression, err))?;

    let rest = rest.trim_start();
    if let Some(found) = rest.chars().next() {
        return Err(EvalError::UnexpectedInput {
            found,
            position: position_of(expression, rest),
        });
    }

    Ok(node)
}
