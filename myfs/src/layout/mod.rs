//! # 磁盘数据结构层
//!
//! 超级块与目录项都是定长记录，经`binrw`以小端序编解码，
//! 不再直接对块缓冲做指针运算。

mod entry;
mod super_block;

pub use self::{
    entry::{Entry, EntryKind, Name, is_free_slot},
    super_block::SuperBlock,
};
