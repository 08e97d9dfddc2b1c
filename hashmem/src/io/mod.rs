pub mod fasta;
pub mod mummer;
pub mod workdir;
