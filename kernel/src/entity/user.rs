mod id;

pub use self::id::*;
