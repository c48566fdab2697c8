use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, one_of, space0},
    combinator::{all_consuming, map, map_opt, map_res, opt},
    error::{context, ErrorKind, ParseError, VerboseError},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
};

use crate::{
    records::{AsyncKind, AsyncRecord, Record, ResultClass, ResultRecord, Results, StreamKind, Value},
    Token, PROMPT,
};

type Res<I, O> = nom::IResult<I, O, VerboseError<I>>;

fn token(input: &str) -> Res<&str, Token> {
    context("token", map_res(digit1, |s: &str| s.parse::<Token>()))(input)
}

fn identifier(input: &str) -> Res<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_')(input)
}

/// A double-quoted C string. GDB escapes non-printable bytes as octal, and a
/// multi-byte UTF-8 character arrives as consecutive octal escapes, so the
/// contents are collected as bytes before decoding.
fn c_string(input: &str) -> Res<&str, String> {
    let (mut rest, _) = char('"')(input)?;
    let mut bytes: Vec<u8> = Vec::new();
    let mut utf8 = [0u8; 4];

    loop {
        let Some(c) = rest.chars().next() else {
            return Err(nom::Err::Error(VerboseError::from_error_kind(
                rest,
                ErrorKind::Char,
            )));
        };

        match c {
            '"' => {
                rest = &rest[1..];
                break;
            }
            '\\' => {
                let after = &rest[1..];
                let Some(escaped) = after.chars().next() else {
                    return Err(nom::Err::Error(VerboseError::from_error_kind(
                        after,
                        ErrorKind::Escaped,
                    )));
                };

                if escaped.is_digit(8) {
                    let len = after
                        .bytes()
                        .take(3)
                        .take_while(|b| (b'0'..=b'7').contains(b))
                        .count();
                    let byte = u8::from_str_radix(&after[..len], 8).map_err(|_| {
                        nom::Err::Error(VerboseError::from_error_kind(after, ErrorKind::Escaped))
                    })?;
                    bytes.push(byte);
                    rest = &after[len..];
                    continue;
                }

                match escaped {
                    'n' => bytes.push(b'\n'),
                    't' => bytes.push(b'\t'),
                    'r' => bytes.push(b'\r'),
                    'e' => bytes.push(0x1b),
                    'a' => bytes.push(0x07),
                    'b' => bytes.push(0x08),
                    'f' => bytes.push(0x0c),
                    'v' => bytes.push(0x0b),
                    other => bytes.extend_from_slice(other.encode_utf8(&mut utf8).as_bytes()),
                }
                rest = &after[escaped.len_utf8()..];
            }
            other => {
                bytes.extend_from_slice(other.encode_utf8(&mut utf8).as_bytes());
                rest = &rest[other.len_utf8()..];
            }
        }
    }

    Ok((rest, String::from_utf8_lossy(&bytes).into_owned()))
}

fn result(input: &str) -> Res<&str, (String, Value)> {
    map(separated_pair(identifier, char('='), mi_value), |(k, v)| {
        (k.to_owned(), v)
    })(input)
}

fn tuple(input: &str) -> Res<&str, Value> {
    context(
        "tuple",
        alt((
            map(tag("{}"), |_| Value::Tuple(Results::default())),
            map(
                delimited(char('{'), separated_list1(char(','), result), char('}')),
                |r| Value::Tuple(Results(r)),
            ),
        )),
    )(input)
}

fn list(input: &str) -> Res<&str, Value> {
    context(
        "list",
        alt((
            map(tag("[]"), |_| Value::List(Vec::new())),
            map(
                delimited(char('['), separated_list1(char(','), mi_value), char(']')),
                Value::List,
            ),
            map(
                delimited(char('['), separated_list1(char(','), result), char(']')),
                |r| Value::ResultList(Results(r)),
            ),
        )),
    )(input)
}

fn mi_value(input: &str) -> Res<&str, Value> {
    alt((map(c_string, Value::Const), tuple, list))(input)
}

fn trailing_results(input: &str) -> Res<&str, Results> {
    map(many0(preceded(char(','), result)), Results)(input)
}

fn result_record(input: &str) -> Res<&str, ResultRecord> {
    let (input, token) = opt(token)(input)?;
    let (input, _) = char('^')(input)?;
    let (input, class) = context(
        "result class",
        map_opt(identifier, ResultClass::from_name),
    )(input)?;
    let (input, results) = trailing_results(input)?;
    Ok((
        input,
        ResultRecord {
            token,
            class,
            results,
        },
    ))
}

fn async_kind(input: &str) -> Res<&str, AsyncKind> {
    map(one_of("*+="), |c| match c {
        '*' => AsyncKind::Exec,
        '+' => AsyncKind::Status,
        _ => AsyncKind::Notify,
    })(input)
}

fn async_record(input: &str) -> Res<&str, AsyncRecord> {
    let (input, (token, kind)) = pair(opt(token), async_kind)(input)?;
    let (input, class) = context("async class", identifier)(input)?;
    let (input, results) = trailing_results(input)?;
    Ok((
        input,
        AsyncRecord {
            token,
            kind,
            class: class.to_owned(),
            results,
        },
    ))
}

fn stream_record(input: &str) -> Res<&str, (StreamKind, String)> {
    let kind = map(one_of("~@&"), |c| match c {
        '~' => StreamKind::Console,
        '@' => StreamKind::Target,
        _ => StreamKind::Log,
    });
    pair(kind, context("stream text", c_string))(input)
}

fn record(input: &str) -> Res<&str, Record> {
    alt((
        map(terminated(tag(PROMPT), space0), |_| Record::Prompt),
        map(result_record, Record::Result),
        map(async_record, Record::Async),
        map(stream_record, |(kind, text)| Record::Stream(kind, text)),
    ))(input)
}

pub(crate) fn parse_record(line: &str) -> Record {
    let line = line.trim_end_matches(['\r', '\n']);
    match all_consuming(record)(line) {
        Ok((_, record)) => record,
        Err(e) => {
            tracing::trace!(%line, error = ?e, "line is not an MI record");
            Record::Unparsed(line.to_owned())
        }
    }
}
