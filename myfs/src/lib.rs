//! myfs：寄居在一个普通宿主文件里的小型层级文件系统。
//!
//! 磁盘布局：
//! 超级块(0号块) | 根目录(1号块) | 空闲块、目录块与文件数据块
//!
//! 除超级块外，每个块末尾的4个字节都是"下一块"指针，0表示链尾。
//! 块的角色（空闲/目录/数据）不记录在块中，只由引用它的链决定。

/* myfs 的整体架构，自上而下 */

// 命令层：拷入、拷出、删除、建目录、删目录、查询
mod vfs;

// 路径解析层
mod path;

// 目录引擎与文件数据引擎
mod dir;
mod file;

// 空闲块链表
mod free_list;

// 超级块管理器
mod control;

// 磁盘数据结构层
pub mod layout;

// 块层：按块号读写的块缓冲
mod block;

mod error;

pub use block_dev::BlockDevice;

pub use self::{
    block::{Block, BlockId},
    control::MyFileSystem,
    dir::{Dir, EntryPos},
    error::{Error, Result},
    layout::{Entry, EntryKind, Name, SuperBlock},
    path::{Location, components},
    vfs::Stat,
};

/// 名称字段的字节数
pub const NAME_LEN: usize = 12;
/// 目录项大小：名称12 + 类型1 + 起始块4 + 大小4
pub const ENTRY_SIZE: usize = 21;
/// 块尾"下一块"指针的字节数
pub const PTR_SIZE: usize = 4;
/// 超级块的有效字节数
pub const SUPER_BLOCK_SIZE: usize = 16;
/// 至少要放下一个目录项与块尾指针
pub const MIN_BLOCK_SIZE: usize = ENTRY_SIZE + PTR_SIZE;
