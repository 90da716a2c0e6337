//! Values bound for a single invocation.
//!
//! The CLI fills an [`Args`] from the parsed command line before calling the
//! handler: scalars by parameter name, and already-opened [`Input`] streams
//! for file parameters. Handlers read them back with typed accessors.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::params::{Choice, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("no parameter named '{0}'")]
    Unknown(String),

    #[error("parameter '{name}' is {actual}, expected {expected}")]
    Type {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("parameter '{name}' has no value")]
    Missing { name: String },

    #[error("'{value}' is not a valid choice for '{name}'")]
    Choice { name: String, value: String },

    #[error("input '{0}' was already taken")]
    InputTaken(String),
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// An open, readable stream handed to a handler.
pub struct Input {
    path: PathBuf,
    reader: Box<dyn BufRead + Send>,
}

impl Input {
    /// Open `path` for reading; `-` means standard input.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if path == Path::new("-") {
            return Ok(Self::from_reader(path, BufReader::new(io::stdin())));
        }
        let file = File::open(path)?;
        Ok(Self::from_reader(path, BufReader::new(file)))
    }

    pub fn from_reader(path: impl Into<PathBuf>, reader: impl BufRead + Send + 'static) -> Self {
        Self {
            path: path.into(),
            reader: Box::new(reader),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_all_to_string(&mut self) -> io::Result<String> {
        let mut text = String::new();
        self.reader.read_to_string(&mut text)?;
        Ok(text)
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input").field("path", &self.path).finish()
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl BufRead for Input {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.reader.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.reader.consume(amt)
    }
}

// ── FromValue ─────────────────────────────────────────────────────────────────

/// Conversion from a bound [`Value`] to a handler-facing type.
pub trait FromValue: Sized {
    fn from_value(name: &str, value: &Value) -> Result<Self, ArgError>;
}

fn type_error(name: &str, expected: &'static str, value: &Value) -> ArgError {
    if value.is_null() {
        return ArgError::Missing {
            name: name.to_owned(),
        };
    }
    ArgError::Type {
        name: name.to_owned(),
        expected,
        actual: value.type_name(),
    }
}

impl FromValue for bool {
    fn from_value(name: &str, value: &Value) -> Result<Self, ArgError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(type_error(name, "bool", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(name: &str, value: &Value) -> Result<Self, ArgError> {
        match value {
            Value::Int(i) => Ok(*i),
            other => Err(type_error(name, "int", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(name: &str, value: &Value) -> Result<Self, ArgError> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            other => Err(type_error(name, "float", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(name: &str, value: &Value) -> Result<Self, ArgError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(type_error(name, "string", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(name: &str, value: &Value) -> Result<Self, ArgError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(name, other).map(Some),
        }
    }
}

// ── Args ──────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum InputSlot {
    Absent,
    Ready(Input),
    Taken,
}

#[derive(Debug, Default)]
pub struct Args {
    values: BTreeMap<String, Value>,
    inputs: BTreeMap<String, InputSlot>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Bind an opened stream (or `None` for an absent optional file).
    pub fn insert_input(&mut self, name: impl Into<String>, input: Option<Input>) {
        let slot = match input {
            Some(input) => InputSlot::Ready(input),
            None => InputSlot::Absent,
        };
        self.inputs.insert(name.into(), slot);
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, input: Option<Input>) -> Self {
        self.insert_input(name, input);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name) || self.inputs.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ArgError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ArgError::Unknown(name.to_owned()))?;
        T::from_value(name, value)
    }

    pub fn choice<E: Choice>(&self, name: &str) -> Result<E, ArgError> {
        self.opt_choice(name)?.ok_or_else(|| ArgError::Missing {
            name: name.to_owned(),
        })
    }

    pub fn opt_choice<E: Choice>(&self, name: &str) -> Result<Option<E>, ArgError> {
        let Some(raw) = self.get::<Option<String>>(name)? else {
            return Ok(None);
        };
        E::parse_choice(&raw).map(Some).ok_or(ArgError::Choice {
            name: name.to_owned(),
            value: raw,
        })
    }

    /// Take ownership of a required file stream.
    pub fn take_input(&mut self, name: &str) -> Result<Input, ArgError> {
        self.take_opt_input(name)?.ok_or_else(|| ArgError::Missing {
            name: name.to_owned(),
        })
    }

    /// Take ownership of an optional file stream; `None` when not given.
    ///
    /// Taking the same input twice is an error.
    pub fn take_opt_input(&mut self, name: &str) -> Result<Option<Input>, ArgError> {
        let slot = self
            .inputs
            .get_mut(name)
            .ok_or_else(|| ArgError::Unknown(name.to_owned()))?;
        match std::mem::replace(slot, InputSlot::Taken) {
            InputSlot::Ready(input) => Ok(Some(input)),
            InputSlot::Absent => {
                *slot = InputSlot::Absent;
                Ok(None)
            }
            InputSlot::Taken => Err(ArgError::InputTaken(name.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Kind {
        Users,
        Orders,
    }

    impl Choice for Kind {
        const VARIANTS: &'static [Self] = &[Self::Users, Self::Orders];
        fn value(&self) -> &'static str {
            match self {
                Self::Users => "users",
                Self::Orders => "orders",
            }
        }
    }

    fn input(text: &'static str) -> Input {
        Input::from_reader("mem.txt", Cursor::new(text.as_bytes()))
    }

    #[test]
    fn typed_getters() {
        let args = Args::new()
            .with("count", 3_i64)
            .with("ratio", 0.5)
            .with("name", "bob")
            .with("force", true)
            .with("label", Value::Null);

        assert_eq!(args.get::<i64>("count").unwrap(), 3);
        assert_eq!(args.get::<f64>("ratio").unwrap(), 0.5);
        assert_eq!(args.get::<f64>("count").unwrap(), 3.0);
        assert_eq!(args.get::<String>("name").unwrap(), "bob");
        assert!(args.get::<bool>("force").unwrap());
        assert_eq!(args.get::<Option<String>>("label").unwrap(), None);
        assert_eq!(args.get::<Option<i64>>("count").unwrap(), Some(3));
    }

    #[test]
    fn getter_errors() {
        let args = Args::new().with("count", 3_i64).with("label", Value::Null);
        assert_eq!(
            args.get::<i64>("nope"),
            Err(ArgError::Unknown("nope".into()))
        );
        assert!(matches!(
            args.get::<String>("count"),
            Err(ArgError::Type { expected: "string", actual: "int", .. })
        ));
        assert!(matches!(
            args.get::<String>("label"),
            Err(ArgError::Missing { .. })
        ));
    }

    #[test]
    fn choices_convert_back_to_members() {
        let args = Args::new()
            .with("data_type", "USERS")
            .with("other", "bogus")
            .with("maybe", Value::Null);
        assert_eq!(args.choice::<Kind>("data_type").unwrap(), Kind::Users);
        assert!(matches!(
            args.choice::<Kind>("other"),
            Err(ArgError::Choice { .. })
        ));
        assert_eq!(args.opt_choice::<Kind>("maybe").unwrap(), None);
    }

    #[test]
    fn inputs_can_be_taken_once() {
        let mut args = Args::new().with_input("data_file", Some(input("hello")));
        let mut taken = args.take_input("data_file").unwrap();
        assert_eq!(taken.read_all_to_string().unwrap(), "hello");
        assert_eq!(taken.path(), Path::new("mem.txt"));
        assert_eq!(
            args.take_input("data_file").unwrap_err(),
            ArgError::InputTaken("data_file".into())
        );
    }

    #[test]
    fn absent_optional_input_is_none() {
        let mut args = Args::new().with_input("data_file", None);
        assert!(args.take_opt_input("data_file").unwrap().is_none());
        assert!(matches!(
            args.take_input("data_file"),
            Err(ArgError::Missing { .. })
        ));
        assert!(matches!(
            args.take_opt_input("unknown"),
            Err(ArgError::Unknown(_))
        ));
    }

    #[test]
    fn open_reads_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "abc").unwrap();
        let mut input = Input::open(&path).unwrap();
        assert_eq!(input.read_all_to_string().unwrap(), "abc");
        assert!(Input::open(dir.path().join("missing.txt")).is_err());
    }
}
