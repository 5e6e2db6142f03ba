// Digest computation module
// Algorithm registry and the streaming digest engine

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use blake2::{Blake2b512, Blake2s256};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};
use tracing::debug;

use super::error::{DigestToolError, Result};

/// Trait for hash algorithm implementations
pub trait Hasher: Send {
    /// Update the hasher with new data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the result
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Get the output size in bytes
    fn output_size(&self) -> usize;
}

// Every RustCrypto hasher shares the `Digest` trait from digest 0.10
struct RustCryptoHasher<D>(D);

impl<D: Digest + Send> Hasher for RustCryptoHasher<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

struct Blake3Hasher(blake3::Hasher);

impl Hasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) {
        // splits large buffers across the rayon pool
        self.0.update_rayon(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().as_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        blake3::OUT_LEN
    }
}

/// A supported cryptographic hash algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Blake2b512,
    Blake2s256,
    Blake3,
}

/// Information about a hash algorithm, for `--list`
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub output_bits: usize,
    pub aliases: &'static [&'static str],
}

impl Algorithm {
    pub const ALL: [Algorithm; 13] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Sha3_224,
        Algorithm::Sha3_256,
        Algorithm::Sha3_384,
        Algorithm::Sha3_512,
        Algorithm::Blake2b512,
        Algorithm::Blake2s256,
        Algorithm::Blake3,
    ];

    /// Canonical label, as written to the ledger and the report
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha224 => "SHA-224",
            Algorithm::Sha256 => "SHA-256",
            Algorithm::Sha384 => "SHA-384",
            Algorithm::Sha512 => "SHA-512",
            Algorithm::Sha3_224 => "SHA3-224",
            Algorithm::Sha3_256 => "SHA3-256",
            Algorithm::Sha3_384 => "SHA3-384",
            Algorithm::Sha3_512 => "SHA3-512",
            Algorithm::Blake2b512 => "BLAKE2b-512",
            Algorithm::Blake2s256 => "BLAKE2s-256",
            Algorithm::Blake3 => "BLAKE3",
        }
    }

    /// Other spellings accepted on the command line and in the ledger
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Algorithm::Md5 => &[],
            Algorithm::Sha1 => &["SHA-1"],
            Algorithm::Sha224 => &["SHA224"],
            Algorithm::Sha256 => &["SHA256"],
            Algorithm::Sha384 => &["SHA384"],
            Algorithm::Sha512 => &["SHA512"],
            Algorithm::Sha3_224 => &["SHA3_224"],
            Algorithm::Sha3_256 => &["SHA3_256"],
            Algorithm::Sha3_384 => &["SHA3_384"],
            Algorithm::Sha3_512 => &["SHA3_512"],
            Algorithm::Blake2b512 => &["BLAKE2b"],
            Algorithm::Blake2s256 => &["BLAKE2s"],
            Algorithm::Blake3 => &[],
        }
    }

    /// Whether a ledger token names this algorithm
    ///
    /// Unknown tokens never match, so foreign records are carried through
    /// untouched.
    pub fn matches_label(self, token: &str) -> bool {
        token.parse::<Algorithm>().map(|a| a == self).unwrap_or(false)
    }

    /// Get a fresh hasher instance for this algorithm
    pub fn hasher(self) -> Box<dyn Hasher> {
        match self {
            Algorithm::Md5 => Box::new(RustCryptoHasher(Md5::new())),
            Algorithm::Sha1 => Box::new(RustCryptoHasher(Sha1::new())),
            Algorithm::Sha224 => Box::new(RustCryptoHasher(Sha224::new())),
            Algorithm::Sha256 => Box::new(RustCryptoHasher(Sha256::new())),
            Algorithm::Sha384 => Box::new(RustCryptoHasher(Sha384::new())),
            Algorithm::Sha512 => Box::new(RustCryptoHasher(Sha512::new())),
            Algorithm::Sha3_224 => Box::new(RustCryptoHasher(Sha3_224::new())),
            Algorithm::Sha3_256 => Box::new(RustCryptoHasher(Sha3_256::new())),
            Algorithm::Sha3_384 => Box::new(RustCryptoHasher(Sha3_384::new())),
            Algorithm::Sha3_512 => Box::new(RustCryptoHasher(Sha3_512::new())),
            Algorithm::Blake2b512 => Box::new(RustCryptoHasher(Blake2b512::new())),
            Algorithm::Blake2s256 => Box::new(RustCryptoHasher(Blake2s256::new())),
            Algorithm::Blake3 => Box::new(Blake3Hasher(blake3::Hasher::new())),
        }
    }

    /// List all available hash algorithms
    pub fn list() -> Vec<AlgorithmInfo> {
        Self::ALL
            .iter()
            .map(|&alg| AlgorithmInfo {
                name: alg.label(),
                output_bits: alg.hasher().output_size() * 8,
                aliases: alg.aliases(),
            })
            .collect()
    }
}

impl FromStr for Algorithm {
    type Err = DigestToolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|alg| {
                alg.label().eq_ignore_ascii_case(s)
                    || alg.aliases().iter().any(|a| a.eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| DigestToolError::UnsupportedAlgorithm {
                algorithm: s.to_string(),
            })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Render digest bytes the way the ledger stores them: uppercase, no separators
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Digest engine with streaming file I/O
#[derive(Debug, Clone)]
pub struct DigestEngine {
    algorithm: Algorithm,
    buffer_size: usize,
}

pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

impl DigestEngine {
    /// Create an engine with the default 1MB read buffer
    pub fn new(algorithm: Algorithm) -> Self {
        Self::with_buffer_size(algorithm, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(algorithm: Algorithm, buffer_size: usize) -> Self {
        Self {
            algorithm,
            buffer_size: buffer_size.max(1),
        }
    }

    /// Digest an in-memory byte sequence
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = self.algorithm.hasher();
        hasher.update(data);
        hasher.finalize()
    }

    /// Digest a file's content, streaming it through the hasher
    pub fn digest_file(&self, path: &Path) -> Result<Vec<u8>> {
        let mut file = File::open(path)
            .map_err(|e| DigestToolError::from_io_error(e, "reading", path))?;

        let mut hasher = self.algorithm.hasher();
        let mut buffer = vec![0u8; self.buffer_size];
        let mut total = 0u64;
        loop {
            let bytes_read = file
                .read(&mut buffer)
                .map_err(|e| DigestToolError::from_io_error(e, "reading", path))?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
            total += bytes_read as u64;
        }

        let digest = hasher.finalize();
        debug!(path = %path.display(), bytes = total, algorithm = %self.algorithm, "computed digest");
        Ok(digest)
    }
}
