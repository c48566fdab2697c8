//! Output records emitted by GDB
use std::fmt;

use crate::Token;

/// An ordered list of `name=value` pairs.
///
/// MI permits repeated names (e.g. `bkpt={..},bkpt={..}` inside a list), so
/// this is a vector rather than a map. Lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Results(pub Vec<(String, Value)>);

impl Results {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get_str(key).and_then(|s| s.parse().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get_str(key).and_then(|s| s.parse().ok())
    }

    /// MI booleans are spelled `"y"` / `"n"`
    pub fn get_flag(&self, key: &str) -> Option<bool> {
        match self.get_str(key)? {
            "y" => Some(true),
            "n" => Some(false),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An MI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A c-string constant, already unescaped
    Const(String),
    /// `{name=value,...}`
    Tuple(Results),
    /// `[value,...]`
    List(Vec<Value>),
    /// `[name=value,...]`
    ResultList(Results),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Const(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_results(&self) -> Option<&Results> {
        match self {
            Value::Tuple(r) | Value::ResultList(r) => Some(r),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_results().and_then(|r| r.get(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.as_results().and_then(|r| r.get_str(key))
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.as_results().and_then(|r| r.get_u32(key))
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.as_results().and_then(|r| r.get_u64(key))
    }

    pub fn get_flag(&self, key: &str) -> Option<bool> {
        self.as_results().and_then(|r| r.get_flag(key))
    }

    /// The elements of a list, whichever list form it takes
    ///
    /// For `[name=value,...]` the names are dropped. Anything that is not a
    /// list (including GDB's occasional `{}` for an empty list) has no
    /// elements.
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Value::List(items) => items.iter().collect(),
            Value::ResultList(results) => results.0.iter().map(|(_, v)| v).collect(),
            _ => Vec::new(),
        }
    }
}

/// The class of a result record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    Done,
    Running,
    Connected,
    Error,
    Exit,
}

impl ResultClass {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "done" => Some(Self::Done),
            "running" => Some(Self::Running),
            "connected" => Some(Self::Connected),
            "error" => Some(Self::Error),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// `[token]^class[,results]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub token: Option<Token>,
    pub class: ResultClass,
    pub results: Results,
}

impl ResultRecord {
    /// The `msg` field of an `^error` record
    pub fn error_message(&self) -> Option<&str> {
        match self.class {
            ResultClass::Error => Some(self.results.get_str("msg").unwrap_or("unknown error")),
            _ => None,
        }
    }
}

/// The three flavours of asynchronous record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncKind {
    /// `*` - execution state changes (`running`, `stopped`)
    Exec,
    /// `+` - progress of slow operations
    Status,
    /// `=` - notifications (`breakpoint-created`, `library-loaded`, ...)
    Notify,
}

/// `[token]*class[,results]`, `+class...` or `=class...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncRecord {
    pub token: Option<Token>,
    pub kind: AsyncKind,
    pub class: String,
    pub results: Results,
}

/// Which stream a stream record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// `~` - output of CLI commands
    Console,
    /// `@` - output of the program being debugged
    Target,
    /// `&` - GDB internal messages, including command echo and errors
    Log,
}

/// A single line of GDB output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Result(ResultRecord),
    Async(AsyncRecord),
    Stream(StreamKind, String),
    /// The `(gdb)` prompt terminating a batch of output
    Prompt,
    /// A line that is not MI at all, typically output of the debuggee
    /// sharing GDB's stdout
    Unparsed(String),
}

impl Record {
    /// Parse one line of output (without its line terminator)
    pub fn parse(line: &str) -> Self {
        crate::parse::parse_record(line)
    }
}

impl fmt::Display for ResultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultClass::Done => "done",
            ResultClass::Running => "running",
            ResultClass::Connected => "connected",
            ResultClass::Error => "error",
            ResultClass::Exit => "exit",
        };
        f.write_str(name)
    }
}
