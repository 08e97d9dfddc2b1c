pub mod encoded;
pub mod kmer_hash;
pub mod primes;
pub mod records;
