// Application pipelines — the use-cases the CLI drives.

pub mod catalog;
