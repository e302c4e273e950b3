//! # module-consoledicts
//!
//! Two versions of a `dict` interface and two console readers pinned to
//! different major versions of it.
//!
//! `module1` requires `dict@~1.0.0` and `module2` requires `dict@~2.0.0`, so a
//! run with both dictionaries installed prints one line per reader, each
//! naming the dictionary it was handed:
//!
//! ```text
//! Module 1 dict says old dict
//! Module 2 dict says new dict
//! ```

use async_trait::async_trait;
use disuware_runtime::{InitContext, Instance, Module, ModuleCatalog, ModuleContext};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// The contract behind the `dict` interface.
pub trait Dictionary: Send + Sync {
    /// Look up a word.
    fn lookup(&self, word: &str) -> Option<&str>;
}

/// Shared handle to a dictionary, as registered under `dict`.
pub type DictionaryHandle = Arc<dyn Dictionary>;

/// A dictionary backed by a fixed word list.
pub struct WordList {
    words: HashMap<&'static str, &'static str>,
}

impl WordList {
    fn new(words: &[(&'static str, &'static str)]) -> Self {
        Self {
            words: words.iter().copied().collect(),
        }
    }

    /// The `dict@1.0.0` word list.
    pub fn old() -> Self {
        Self::new(&[("dict", "old dict"), ("hello", "hallo")])
    }

    /// The `dict@2.0.0` word list.
    pub fn new_edition() -> Self {
        Self::new(&[("dict", "new dict"), ("hello", "hello"), ("bye", "goodbye")])
    }
}

impl Dictionary for WordList {
    fn lookup(&self, word: &str) -> Option<&str> {
        self.words.get(word).copied()
    }
}

/// Provides `dict`.
pub struct DictModule {
    dictionary: DictionaryHandle,
}

impl Module for DictModule {
    fn exports(&self) -> Instance {
        Instance::new(Arc::clone(&self.dictionary))
    }
}

/// A reader that prints what its bound dictionary calls itself.
pub struct ConsoleReader {
    line: String,
}

impl ConsoleReader {
    fn load(ctx: &ModuleContext, label: &str) -> anyhow::Result<Self> {
        let dict: DictionaryHandle = ctx.capabilities().get("dict")?;
        let says = dict.lookup("dict").unwrap_or("nothing");

        Ok(Self {
            line: format!("{label} dict says {says}"),
        })
    }

    /// The line printed on initialization.
    pub fn line(&self) -> &str {
        &self.line
    }
}

#[async_trait]
impl Module for ConsoleReader {
    fn exports(&self) -> Instance {
        Instance::new(self.line.clone())
    }

    async fn init(&self, _ctx: InitContext) -> anyhow::Result<()> {
        debug!("Printing: {}", self.line);
        println!("{}", self.line);
        Ok(())
    }
}

/// Register every entry point of this crate.
pub fn register(catalog: &mut ModuleCatalog) {
    catalog
        .register("dict@1.0.0", |_| {
            Ok(Box::new(DictModule {
                dictionary: Arc::new(WordList::old()),
            }))
        })
        .register("dict@2.0.0", |_| {
            Ok(Box::new(DictModule {
                dictionary: Arc::new(WordList::new_edition()),
            }))
        })
        .register("module1@1.0.0", |ctx| {
            Ok(Box::new(ConsoleReader::load(ctx, "Module 1")?))
        })
        .register("module2@1.0.0", |ctx| {
            Ok(Box::new(ConsoleReader::load(ctx, "Module 2")?))
        });
}
