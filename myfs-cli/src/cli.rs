use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manipulate myfs images: a hierarchy of small files kept inside one host file.
#[derive(Parser)]
#[command(name = "myfs", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create (or overwrite) a filesystem image
    Mkfs {
        fsfile: PathBuf,
        /// Bytes per block
        block_size: u32,
        /// Total number of blocks, superblock and root directory included
        total_blocks: u32,
    },

    /// Copy a host file into the filesystem
    #[command(name = "copyto")]
    CopyTo {
        linuxfile: PathBuf,
        #[arg(value_name = "PATH@FSFILE")]
        target: String,
    },

    /// Copy a file out of the filesystem onto the host
    #[command(name = "copyfrom")]
    CopyFrom {
        #[arg(value_name = "PATH@FSFILE")]
        source: String,
        linuxfile: PathBuf,
    },

    /// Remove a file
    Rm {
        #[arg(value_name = "PATH@FSFILE")]
        target: String,
    },

    /// Create a directory; its parent must exist
    Mkdir {
        #[arg(value_name = "PATH@FSFILE")]
        target: String,
    },

    /// Remove an empty directory
    Rmdir {
        #[arg(value_name = "PATH@FSFILE")]
        target: String,
    },

    /// Show the metadata of a file or directory
    Stat {
        #[arg(value_name = "PATH@FSFILE")]
        target: String,
    },

    /// List a directory
    Ls {
        #[arg(value_name = "PATH@FSFILE")]
        target: String,
    },

    /// Dump the first 64 bytes of one block of a file
    Readblock {
        #[arg(value_name = "PATH@FSFILE")]
        source: String,
        /// Index of the block within the file, from 0
        block_no: usize,
    },

    /// Show the superblock and free space
    Info { fsfile: PathBuf },
}
