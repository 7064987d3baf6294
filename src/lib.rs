// src/lib.rs
//
// unfoldhtml — expand accordion/FAQ widgets in a tree of HTML files to their
// open default state, and slug-normalize filenames.
//
// The pipeline is a pure text-to-text transformation applied independently
// to each file: a byte-level tag scanner locates candidate tags, a
// declarative rule table decides which need rewriting, and per-rule counts
// are threaded back to the caller. Files are written back only when changed.

pub mod batch;
pub mod engine;
pub mod report;
pub mod rules;
pub mod slug;
pub mod tag;
