//! Memory protection for secrets.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Holds a chunk of memory that is zeroed when dropped.
///
/// Key material and passwords are kept in `Protected` buffers so
/// that freed heap memory does not retain secrets.  The `Debug`
/// implementation redacts the contents.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Protected(Box<[u8]>);

impl Protected {
    /// Creates a zeroed buffer of the given size.
    pub fn new(size: usize) -> Self {
        vec![0u8; size].into()
    }

    /// Returns the contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Protected {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Protected {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<u8>> for Protected {
    fn from(v: Vec<u8>) -> Self {
        Protected(v.into_boxed_slice())
    }
}

impl From<Box<[u8]>> for Protected {
    fn from(v: Box<[u8]>) -> Self {
        Protected(v)
    }
}

impl From<&[u8]> for Protected {
    fn from(v: &[u8]) -> Self {
        Vec::from(v).into()
    }
}

impl Drop for Protected {
    fn drop(&mut self) {
        unsafe {
            memsec::memzero(self.0.as_mut_ptr(), self.0.len());
        }
    }
}

impl fmt::Debug for Protected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if cfg!(debug_assertions) {
            write!(f, "{:?}", self.0)
        } else {
            f.write_str("[<Protected>]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        let p: Protected = vec![1, 2, 3].into();
        assert_eq!(p.as_bytes(), &[1, 2, 3]);
        assert_eq!(&p[..2], &[1, 2]);
    }

    #[test]
    fn new_is_zeroed() {
        let p = Protected::new(8);
        assert_eq!(p.as_bytes(), &[0; 8]);
    }
}
