//! Ready-made leaf commands.
//!
//! Each one reaches into the document through an accessor closure and
//! implements [`Stable`](crate::Stable). Push them with
//! [`Stable::into_command`](crate::Stable::into_command).

mod assign;
mod delegate;
mod dumper;
mod map;
mod memory;
mod object;
mod sequence;
mod sleep;

pub use assign::{Assign, ConvertAssign};
pub use delegate::Delegatable;
pub use dumper::DebugDumper;
pub use map::{InsertMap, KeyedMap, RemoveMap};
pub use memory::{AssignMemory, ByteAccessor};
pub use object::{AssignNewObject, GrabDeleteObject, GrabNewObject};
pub use sequence::{Insert, PopBack, PushBack, Remove, RemoveByValue, Sequence};
pub use sleep::{Awake, Sleep, Sleepable};
