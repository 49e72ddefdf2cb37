//! myfs 的宿主端工具：把镜像文件当作块设备，执行命令行上的各条命令。

mod block_file;
pub mod cli;
mod commands;

pub use self::{block_file::BlockFile, commands::run};
