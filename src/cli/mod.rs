//! Command-line interface.

pub mod args;

pub use args::{
    ArchiveArgs, Args, Command, CountArgs, DiffArgs, FlattenArgs, NamingArgs, RenameArgs,
    ResolveArgs,
};
