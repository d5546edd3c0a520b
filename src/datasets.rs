//! # Named datasets and the command layer
//!
//! A [`Datasets`] collection binds names to integer-keyed string maps and executes line-oriented
//! commands against them:
//!
//! ```text
//! print <name>
//! union <new> <a> <b>
//! intersect <new> <a> <b>
//! complement <new> <a> <b>
//! ```
//!
//! Data is read from whitespace-separated text where each dataset name is followed by
//! alternating key and value tokens:
//!
//! ```text
//! first 1 name 2 jungle
//! second 2 tree 3 river
//! empty
//! ```
//!
//! # Example
//!
//! ```
//! use avl_tree_map::Datasets;
//!
//! let mut datasets = Datasets::parse("first 1 name 2 jungle\nsecond 2 tree 3 river").unwrap();
//! let mut out = String::new();
//! datasets.run("union both first second\nprint both\nprint nothing\n", &mut out).unwrap();
//! assert_eq!(out, "both 1 name 2 jungle 3 river\n<INVALID COMMAND>\n");
//! ```

use core::fmt::Write;

use alloc::borrow::ToOwned;
use alloc::string::String;

use smallvec::SmallVec;

use crate::avl_tree_map::AvlTreeMap;
use crate::error::{Error, Result};

/// One named dataset: integer keys to string values.
pub type Dataset = AvlTreeMap<i64, String>;

/// A set combinator applied by a command.
type Combinator = fn(&Dataset, &Dataset) -> Dataset;

/// A parsed command line, borrowing its names from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command<'a> {
    Print(&'a str),
    Combine {
        op: Op,
        target: &'a str,
        left: &'a str,
        right: &'a str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Union,
    Intersect,
    Complement,
}

impl Op {
    fn combinator(self) -> Combinator {
        match self {
            Op::Union => Dataset::union,
            Op::Intersect => Dataset::intersection,
            Op::Complement => Dataset::complement,
        }
    }
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Result<Self> {
        let tokens: SmallVec<[&str; 5]> = line.split_whitespace().collect();
        let op = match tokens.as_slice() {
            ["print", name] => return Ok(Command::Print(*name)),
            [word @ ("union" | "intersect" | "complement"), ..] if tokens.len() != 4 => {
                return Err(Error::UnknownCommand((*word).to_owned()));
            }
            ["union", ..] => Op::Union,
            ["intersect", ..] => Op::Intersect,
            ["complement", ..] => Op::Complement,
            [word, ..] => return Err(Error::UnknownCommand((*word).to_owned())),
            [] => return Err(Error::UnknownCommand(String::new())),
        };
        Ok(Command::Combine {
            op,
            target: tokens[1],
            left: tokens[2],
            right: tokens[3],
        })
    }
}

/// Datasets bound by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Datasets {
    sets: AvlTreeMap<String, Dataset>,
}

impl Datasets {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sets: AvlTreeMap::new(),
        }
    }

    /// Reads datasets from text.
    ///
    /// A token that parses as an `i64` where a key is expected is a key and the token after it
    /// is its value. Any other token starts a new dataset of that name. Repeated keys overwrite,
    /// repeated names rebind, and a name with no pairs makes an empty dataset.
    ///
    /// # Errors
    ///
    /// [`Error::MissingValue`] if the text ends right after a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::Datasets;
    ///
    /// let datasets = Datasets::parse("a 2 two 1 one\nb").unwrap();
    /// assert_eq!(datasets.get("a").map(|d| d.len()), Some(2));
    /// assert!(datasets.get("b").is_some_and(|d| d.is_empty()));
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let mut datasets = Self::new();
        let mut tokens = input.split_whitespace();
        let mut current: Option<(String, Dataset)> = None;

        while let Some(token) = tokens.next() {
            match (current.as_mut(), token.parse::<i64>()) {
                (Some((_, dataset)), Ok(key)) => {
                    let value = tokens.next().ok_or_else(|| Error::MissingValue(token.to_owned()))?;
                    dataset.insert(key, value.to_owned());
                }
                _ => {
                    if let Some((name, dataset)) = current.replace((token.to_owned(), Dataset::new())) {
                        datasets.insert(name, dataset);
                    }
                }
            }
        }
        if let Some((name, dataset)) = current {
            datasets.insert(name, dataset);
        }

        tracing::debug!(count = datasets.len(), "parsed datasets");
        Ok(datasets)
    }

    /// Number of bound names.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if no name is bound.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Returns the dataset bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.sets.get(name)
    }

    /// Binds `dataset` to `name`, returning the dataset it replaces.
    pub fn insert(&mut self, name: String, dataset: Dataset) -> Option<Dataset> {
        tracing::trace!(%name, len = dataset.len(), "bound dataset");
        self.sets.insert(name, dataset)
    }

    /// Iterates over the bound names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    fn lookup(&self, name: &str) -> Result<&Dataset> {
        self.get(name).ok_or_else(|| Error::UnknownDataset(name.to_owned()))
    }

    /// Writes `<name> <k1> <v1> <k2> <v2> ...` and a newline, in ascending key order.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownDataset`] if `name` is unbound, [`Error::EmptyDataset`] if it has no
    /// entries, [`Error::Output`] if writing fails.
    pub fn print<W: Write>(&self, name: &str, out: &mut W) -> Result<()> {
        let dataset = self.lookup(name)?;
        if dataset.is_empty() {
            return Err(Error::EmptyDataset(name.to_owned()));
        }
        out.write_str(name)?;
        for (key, value) in dataset {
            write!(out, " {key} {value}")?;
        }
        out.write_char('\n')?;
        Ok(())
    }

    fn combine(&mut self, target: &str, left: &str, right: &str, op: Combinator) -> Result<()> {
        let result = op(self.lookup(left)?, self.lookup(right)?);
        self.insert(target.to_owned(), result);
        Ok(())
    }

    /// Binds `target` to the union of `left` and `right`. On a shared key `left`'s value wins.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownDataset`] if `left` or `right` is unbound.
    pub fn union(&mut self, target: &str, left: &str, right: &str) -> Result<()> {
        self.combine(target, left, right, Op::Union.combinator())
    }

    /// Binds `target` to the entries of `left` whose key is also in `right`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownDataset`] if `left` or `right` is unbound.
    pub fn intersect(&mut self, target: &str, left: &str, right: &str) -> Result<()> {
        self.combine(target, left, right, Op::Intersect.combinator())
    }

    /// Binds `target` to the entries whose key is in exactly one of `left` and `right`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownDataset`] if `left` or `right` is unbound.
    pub fn complement(&mut self, target: &str, left: &str, right: &str) -> Result<()> {
        self.combine(target, left, right, Op::Complement.combinator())
    }

    /// Executes one command line.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownCommand`] for an unknown command word or a wrong argument count, plus the
    /// errors of the command itself.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        match Command::parse(line)? {
            Command::Print(name) => self.print(name, out),
            Command::Combine {
                op,
                target,
                left,
                right,
            } => self.combine(target, left, right, op.combinator()),
        }
    }

    /// Executes every non-blank line of `input`. A failing command writes its
    /// [`user_message`](Error::user_message) as a line and processing moves on to the next line.
    ///
    /// # Errors
    ///
    /// Only [`Error::Output`], when writing to `out` fails.
    pub fn run<W: Write>(&mut self, input: &str, out: &mut W) -> Result<()> {
        for line in input.lines().filter(|line| !line.trim().is_empty()) {
            match self.execute(line, out) {
                Ok(()) => {}
                Err(error @ Error::Output(_)) => return Err(error),
                Err(error) => {
                    tracing::debug!(%error, line, "command failed");
                    writeln!(out, "{}", error.user_message())?;
                }
            }
        }
        Ok(())
    }
}
