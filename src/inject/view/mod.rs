mod list;

pub use list::ListView;
