//! In-memory model of the calculator widget behind [`MockSession`].
//!
//! Input is collected as a token stream and evaluated on `=` with the usual
//! precedence: `√` prefix, `!` `%` and `^` postfix, `*` `/` over `+` `-`.
//! The display groups integer digits in threes with spaces, as the real
//! widget does.
//!
//! [`MockSession`]: super::MockSession

use crate::keypad::Key;

/// Text shown when evaluation fails
pub const ERROR_TEXT: &str = "Error";

/// Largest n for which n! is finite in f64
const MAX_FACTORIAL: u32 = 170;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
            Self::Divide => "÷",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Op(BinaryOp),
    Root,
    Factorial,
    Percent,
    Power(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalcError {
    Syntax,
    Domain,
    DivideByZero,
}

/// Button-driven calculator state
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    tokens: Vec<Token>,
    entry: String,
    exponent_entry: Option<String>,
    result: Option<String>,
}

impl Calculator {
    /// Create a cleared calculator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the exponent popover keypad is open
    #[must_use]
    pub const fn keypad_open(&self) -> bool {
        self.exponent_entry.is_some()
    }

    /// Press a digit on the main keypad
    pub fn press_digit(&mut self, digit: char) {
        if !digit.is_ascii_digit() || self.keypad_open() {
            return;
        }
        if self.result.is_some() {
            self.clear();
        }
        if self.entry == "0" {
            self.entry.clear();
        }
        self.entry.push(digit);
    }

    /// Press a digit on the exponent keypad
    pub fn press_exponent_digit(&mut self, digit: char) {
        if let Some(exponent) = self.exponent_entry.as_mut() {
            if digit.is_ascii_digit() {
                exponent.push(digit);
            }
        }
    }

    /// Press a functional key
    pub fn press(&mut self, key: Key) {
        if self.keypad_open() && key != Key::Confirm && key != Key::Clear {
            return;
        }
        match key {
            Key::Clear => self.clear(),
            Key::Plus => self.binary(BinaryOp::Add),
            Key::Minus => self.binary(BinaryOp::Subtract),
            Key::Multiply => self.binary(BinaryOp::Multiply),
            Key::Divide => self.binary(BinaryOp::Divide),
            Key::Root => {
                if self.result.is_some() {
                    self.clear();
                }
                self.commit_entry();
                self.tokens.push(Token::Root);
            }
            Key::Factorial => self.postfix(Token::Factorial),
            Key::Percent => self.postfix(Token::Percent),
            Key::Exponent => {
                self.continue_from_result();
                self.commit_entry();
                self.exponent_entry = Some(String::new());
            }
            Key::Confirm => {
                if let Some(exponent) = self.exponent_entry.take() {
                    if !exponent.is_empty() {
                        self.tokens.push(Token::Power(exponent));
                    }
                }
            }
            Key::Equal => self.equals(),
        }
    }

    /// Raw display text, digit-grouped
    #[must_use]
    pub fn display(&self) -> String {
        if let Some(result) = &self.result {
            return group_digits(result);
        }
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Number(n) => out.push_str(&group_digits(n)),
                Token::Op(op) => {
                    out.push(' ');
                    out.push_str(op.symbol());
                    out.push(' ');
                }
                Token::Root => out.push('√'),
                Token::Factorial => out.push('!'),
                Token::Percent => out.push('%'),
                Token::Power(e) => {
                    out.push('^');
                    out.push_str(e);
                }
            }
        }
        out.push_str(&group_digits(&self.entry));
        if let Some(exponent) = &self.exponent_entry {
            out.push('^');
            out.push_str(exponent);
        }
        if out.trim().is_empty() {
            "0".to_string()
        } else {
            out.trim_end().to_string()
        }
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn commit_entry(&mut self) {
        if !self.entry.is_empty() {
            self.tokens.push(Token::Number(std::mem::take(&mut self.entry)));
        }
    }

    fn continue_from_result(&mut self) {
        if let Some(result) = self.result.take() {
            self.tokens.clear();
            if result != ERROR_TEXT {
                self.tokens.push(Token::Number(result));
            }
        }
    }

    fn binary(&mut self, op: BinaryOp) {
        self.continue_from_result();
        self.commit_entry();
        match self.tokens.last() {
            Some(Token::Op(_)) => {
                self.tokens.pop();
                self.tokens.push(Token::Op(op));
            }
            Some(Token::Root) => {}
            Some(_) => self.tokens.push(Token::Op(op)),
            None => {
                // leading minus negates the first operand
                if op == BinaryOp::Subtract {
                    self.tokens.push(Token::Number("0".to_string()));
                    self.tokens.push(Token::Op(op));
                }
            }
        }
    }

    fn postfix(&mut self, token: Token) {
        self.continue_from_result();
        self.commit_entry();
        if matches!(
            self.tokens.last(),
            Some(Token::Number(_) | Token::Factorial | Token::Percent | Token::Power(_))
        ) {
            self.tokens.push(token);
        }
    }

    fn equals(&mut self) {
        if self.result.is_some() {
            return;
        }
        self.commit_entry();
        if self.tokens.is_empty() {
            return;
        }
        let text = match evaluate(&self.tokens) {
            Ok(value) => format_number(value).unwrap_or_else(|| ERROR_TEXT.to_string()),
            Err(_) => ERROR_TEXT.to_string(),
        };
        self.tokens.clear();
        self.result = Some(text);
    }
}

fn evaluate(tokens: &[Token]) -> Result<f64, CalcError> {
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    if parser.pos == tokens.len() {
        Ok(value)
    } else {
        Err(CalcError::Syntax)
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expression(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Subtract))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == BinaryOp::Add {
                value + rhs
            } else {
                value - rhs
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ (BinaryOp::Multiply | BinaryOp::Divide))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == BinaryOp::Multiply {
                value * rhs
            } else if rhs == 0.0 {
                return Err(CalcError::DivideByZero);
            } else {
                value / rhs
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, CalcError> {
        if self.peek() == Some(&Token::Root) {
            self.pos += 1;
            let operand = self.unary()?;
            if operand < 0.0 {
                return Err(CalcError::Domain);
            }
            return Ok(operand.sqrt());
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<f64, CalcError> {
        let mut value = match self.peek() {
            Some(Token::Number(n)) => n.parse::<f64>().map_err(|_| CalcError::Syntax)?,
            _ => return Err(CalcError::Syntax),
        };
        self.pos += 1;
        loop {
            match self.peek() {
                Some(Token::Factorial) => value = factorial(value)?,
                Some(Token::Percent) => value /= 100.0,
                Some(Token::Power(e)) => {
                    let exponent = e.parse::<f64>().map_err(|_| CalcError::Syntax)?;
                    value = value.powf(exponent);
                }
                _ => return Ok(value),
            }
            self.pos += 1;
        }
    }
}

fn factorial(value: f64) -> Result<f64, CalcError> {
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(MAX_FACTORIAL) {
        return Err(CalcError::Domain);
    }
    Ok((1..=value as u32).map(f64::from).product())
}

/// Render a result without a fractional part when integral
fn format_number(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return Some(format!("{}", value as i64));
    }
    let text = format!("{value:.10}");
    Some(text.trim_end_matches('0').trim_end_matches('.').to_string())
}

/// Group the integer digits of a numeric string in threes with spaces
#[must_use]
pub fn group_digits(number: &str) -> String {
    let (sign, unsigned) = number
        .strip_prefix('-')
        .map_or(("", number), |rest| ("-", rest));
    let (int_part, frac_part) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(i, f)| (i, Some(f)));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*c);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn enter(calc: &mut Calculator, digits: &str) {
        for d in digits.chars() {
            calc.press_digit(d);
        }
    }

    fn normalized(calc: &Calculator) -> String {
        calc.display().split_whitespace().collect()
    }

    mod grouping_tests {
        use super::*;

        #[test]
        fn test_group_digits() {
            assert_eq!(group_digits("1234567890"), "1 234 567 890");
            assert_eq!(group_digits("123"), "123");
            assert_eq!(group_digits("1234"), "1 234");
            assert_eq!(group_digits("-15"), "-15");
            assert_eq!(group_digits("-1500"), "-1 500");
            assert_eq!(group_digits("12345.678"), "12 345.678");
            assert_eq!(group_digits(""), "");
        }

        #[test]
        fn test_format_number() {
            assert_eq!(format_number(120.0).unwrap(), "120");
            assert_eq!(format_number(-15.0).unwrap(), "-15");
            assert_eq!(format_number(0.5).unwrap(), "0.5");
            assert_eq!(format_number(-0.0).unwrap(), "0");
            assert!(format_number(f64::INFINITY).is_none());
        }
    }

    mod arithmetic_tests {
        use super::*;

        #[test]
        fn test_digit_entry() {
            let mut calc = Calculator::new();
            enter(&mut calc, "1234567890");
            assert_eq!(calc.display(), "1 234 567 890");
        }

        #[test]
        fn test_cleared_display_is_zero() {
            assert_eq!(Calculator::new().display(), "0");
        }

        #[test]
        fn test_subtraction_below_zero() {
            let mut calc = Calculator::new();
            enter(&mut calc, "10");
            calc.press(Key::Minus);
            enter(&mut calc, "25");
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "-15");
        }

        #[test]
        fn test_precedence() {
            let mut calc = Calculator::new();
            enter(&mut calc, "0");
            calc.press(Key::Minus);
            enter(&mut calc, "5");
            calc.press(Key::Multiply);
            enter(&mut calc, "3");
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "-15");
        }

        #[test]
        fn test_root_and_factorial() {
            let mut calc = Calculator::new();
            calc.press(Key::Root);
            enter(&mut calc, "16");
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "4");

            calc.press(Key::Clear);
            enter(&mut calc, "5");
            calc.press(Key::Factorial);
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "120");
        }

        #[test]
        fn test_percent_of_product() {
            let mut calc = Calculator::new();
            enter(&mut calc, "200");
            calc.press(Key::Multiply);
            enter(&mut calc, "50");
            calc.press(Key::Percent);
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "100");
        }

        #[test]
        fn test_exponent_via_keypad() {
            let mut calc = Calculator::new();
            enter(&mut calc, "2");
            calc.press(Key::Exponent);
            assert!(calc.keypad_open());
            calc.press_exponent_digit('3');
            calc.press(Key::Confirm);
            assert!(!calc.keypad_open());
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "8");
        }

        #[test]
        fn test_keypad_digit_ignored_when_closed() {
            let mut calc = Calculator::new();
            enter(&mut calc, "2");
            calc.press_exponent_digit('3');
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "2");
        }

        #[test]
        fn test_division_by_zero_is_error() {
            let mut calc = Calculator::new();
            enter(&mut calc, "1");
            calc.press(Key::Divide);
            enter(&mut calc, "0");
            calc.press(Key::Equal);
            assert_eq!(calc.display(), ERROR_TEXT);
        }

        #[test]
        fn test_factorial_of_negative_is_error() {
            let mut calc = Calculator::new();
            enter(&mut calc, "3");
            calc.press(Key::Minus);
            enter(&mut calc, "5");
            calc.press(Key::Equal);
            calc.press(Key::Factorial);
            calc.press(Key::Equal);
            assert_eq!(calc.display(), ERROR_TEXT);
        }

        #[test]
        fn test_leading_minus_negates() {
            let mut calc = Calculator::new();
            calc.press(Key::Minus);
            enter(&mut calc, "4");
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "-4");
        }

        #[test]
        fn test_trailing_operator_is_error() {
            let mut calc = Calculator::new();
            enter(&mut calc, "7");
            calc.press(Key::Plus);
            calc.press(Key::Equal);
            assert_eq!(calc.display(), ERROR_TEXT);
        }

        #[test]
        fn test_digit_after_result_starts_fresh() {
            let mut calc = Calculator::new();
            enter(&mut calc, "2");
            calc.press(Key::Plus);
            enter(&mut calc, "2");
            calc.press(Key::Equal);
            enter(&mut calc, "9");
            assert_eq!(calc.display(), "9");
        }

        #[test]
        fn test_operator_after_result_continues() {
            let mut calc = Calculator::new();
            enter(&mut calc, "2");
            calc.press(Key::Plus);
            enter(&mut calc, "2");
            calc.press(Key::Equal);
            calc.press(Key::Multiply);
            enter(&mut calc, "10");
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "40");
        }

        #[test]
        fn test_repeated_operator_replaces() {
            let mut calc = Calculator::new();
            enter(&mut calc, "6");
            calc.press(Key::Plus);
            calc.press(Key::Multiply);
            enter(&mut calc, "7");
            calc.press(Key::Equal);
            assert_eq!(normalized(&calc), "42");
        }
    }
}
