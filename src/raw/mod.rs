mod arena;
mod cursor;
mod handle;
mod node;
mod raw_tree;

pub(crate) use cursor::Cursor;
pub(crate) use raw_tree::RawTree;
