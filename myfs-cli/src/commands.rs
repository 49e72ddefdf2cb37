use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use block_dev::BlockDevice;
use myfs::{EntryKind, Location, MyFileSystem, Result};
use typed_bytesize::ByteSizeIec;

use crate::BlockFile;
use crate::cli::Command;

/// `readblock`展示的字节数
const DUMP_LEN: usize = 64;
const DUMP_WIDTH: usize = 16;

/// 执行一条命令，结果写往`out`
pub fn run(command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Mkfs {
            fsfile,
            block_size,
            total_blocks,
        } => {
            // 参数有误时不动已有的镜像
            MyFileSystem::check_geometry(block_size, total_blocks)?;
            let len = u64::from(block_size) * u64::from(total_blocks);
            let fd = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&fsfile)
                .map_err(|e| with_path(e, &fsfile))?;
            fd.set_len(len)?;

            let fs = MyFileSystem::format(device(fd), block_size, total_blocks)?;
            writeln!(
                out,
                "Filesystem '{}' created: block size = {block_size}, \
                 total blocks = {total_blocks} ({}), {} free",
                fsfile.display(),
                ByteSizeIec(len),
                fs.free_count()?,
            )?;
        }

        Command::CopyTo { linuxfile, target } => {
            let loc: Location = target.parse()?;
            let data = fs::read(&linuxfile).map_err(|e| with_path(e, &linuxfile))?;
            let mut fs = mount(&loc.image, true)?;
            let stat = fs.copy_in(&loc.path, &data)?;
            writeln!(
                out,
                "Copied '{}' to '{}' ({} bytes, start block {})",
                linuxfile.display(),
                target,
                stat.size,
                stat.start_block,
            )?;
        }

        Command::CopyFrom { source, linuxfile } => {
            let loc: Location = source.parse()?;
            let fs = mount(&loc.image, false)?;
            let data = fs.copy_out(&loc.path)?;
            fs::write(&linuxfile, &data).map_err(|e| with_path(e, &linuxfile))?;
            writeln!(
                out,
                "Copied '{}' to '{}' ({} bytes)",
                source,
                linuxfile.display(),
                data.len(),
            )?;
        }

        Command::Rm { target } => {
            let loc: Location = target.parse()?;
            mount(&loc.image, true)?.remove_file(&loc.path)?;
            writeln!(out, "Removed file '{target}'")?;
        }

        Command::Mkdir { target } => {
            let loc: Location = target.parse()?;
            let stat = mount(&loc.image, true)?.make_dir(&loc.path)?;
            writeln!(
                out,
                "Created directory '{target}' (block {})",
                stat.start_block
            )?;
        }

        Command::Rmdir { target } => {
            let loc: Location = target.parse()?;
            mount(&loc.image, true)?.remove_dir(&loc.path)?;
            writeln!(out, "Removed directory '{target}'")?;
        }

        Command::Stat { target } => {
            let loc: Location = target.parse()?;
            let stat = mount(&loc.image, false)?.stat(&loc.path)?;
            writeln!(out, "{stat}")?;
        }

        Command::Ls { target } => {
            let loc: Location = target.parse()?;
            for stat in mount(&loc.image, false)?.list_dir(&loc.path)? {
                let tag = if stat.kind == EntryKind::Directory { 'd' } else { '-' };
                writeln!(
                    out,
                    "{tag} {:>10} {:>6} {}",
                    stat.size, stat.start_block, stat.name
                )?;
            }
        }

        Command::Readblock { source, block_no } => {
            let loc: Location = source.parse()?;
            let data = mount(&loc.image, false)?.read_file_block(&loc.path, block_no)?;
            let shown = &data[..data.len().min(DUMP_LEN)];
            writeln!(out, "Block {block_no} of '{source}' (first {} bytes):", shown.len())?;
            for row in shown.chunks(DUMP_WIDTH) {
                let hex: Vec<String> = row.iter().map(|b| format!("{b:02x}")).collect();
                writeln!(out, "{}", hex.join(" "))?;
            }
        }

        Command::Info { fsfile } => {
            let fs = mount(&fsfile, false)?;
            let sb = fs.super_block();
            writeln!(out, "Block Size: {}", sb.block_size)?;
            writeln!(out, "Total Blocks: {}", sb.total_blocks)?;
            writeln!(out, "Root Directory: {}", sb.root_dir_block)?;
            writeln!(out, "First Free Block: {}", sb.first_free_block)?;
            writeln!(out, "Free Blocks: {}", fs.free_count()?)?;
        }
    }

    Ok(())
}

fn device(fd: File) -> Arc<dyn BlockDevice> {
    Arc::new(BlockFile::new(fd))
}

fn mount(image: &Path, writable: bool) -> Result<MyFileSystem> {
    let fd = OpenOptions::new()
        .read(true)
        .write(writable)
        .open(image)
        .map_err(|e| with_path(e, image))?;
    log::debug!("mounted {} (writable={writable})", image.display());

    MyFileSystem::open(device(fd))
}

/// 在宿主 I/O 错误上附加文件名
fn with_path(e: io::Error, path: &Path) -> io::Error {
    io::Error::new(e.kind(), format!("{}: {e}", path.display()))
}
