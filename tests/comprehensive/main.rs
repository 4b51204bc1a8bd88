//! End-to-end suite over the public `settle` surface.


mod autosave;
mod load_save;
mod modules;
mod recovery;
mod versioning;
