//! Sign-random-projection hashing (SimHash for dense vectors).
//!
//! A hyperplane set holds `n` random unit normals. Hashing a vector projects
//! it onto each normal and packs the signs into an `n`-bit bucket code: two
//! vectors collide in a bucket with probability `1 - angle(u, v) / pi`, which
//! makes the code a locality-sensitive hash for cosine similarity.
//!
//! ## Bit packing
//!
//! Bit `k` of the code, counting MSB-first, is 1 iff `dot(plane_k, v) > 0`;
//! an exactly-zero projection maps to 0. The sign bits fill a big-endian byte
//! buffer which is then read as an unsigned integer of the requested width,
//! so the same planes produce consistent codes across the 8/16/32/64-bit
//! variants.
//!
//! ## References
//!
//! - Charikar (2002): "Similarity estimation techniques from rounding
//!   algorithms"

use rand::Rng;

use crate::error::{LshError, Result};
use crate::params::MAX_NUM_HYPERPLANES;
use crate::similarity;

/// Planes beyond this count cannot be packed into the widest bucket code.
const MAX_HASH_BITS: usize = 64;

/// An immutable set of random unit normals of a fixed dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperplanes {
    planes: Vec<Vec<f64>>,
}

impl Hyperplanes {
    /// Sample `num_planes` unit normals of dimension `vec_len`.
    ///
    /// Each component is drawn uniformly from [-0.5, 0.5) and the plane is
    /// then L2-normalized.
    pub fn new(num_planes: usize, vec_len: usize) -> Result<Self> {
        let mut rng = rand::rng();
        Self::with_rng(num_planes, vec_len, &mut rng)
    }

    /// Like [`Hyperplanes::new`] but drawing from a caller-supplied RNG, for
    /// deterministic construction.
    pub fn with_rng<R: Rng + ?Sized>(
        num_planes: usize,
        vec_len: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if num_planes < 1 {
            return Err(LshError::InvalidNumHyperplanes);
        }
        if num_planes > MAX_NUM_HYPERPLANES {
            return Err(LshError::ExceededMaxNumHyperplanes);
        }
        if vec_len < 1 {
            return Err(LshError::InvalidVectorLength);
        }
        let mut planes = Vec::with_capacity(num_planes);
        for _ in 0..num_planes {
            let mut plane: Vec<f64> = (0..vec_len).map(|_| rng.random::<f64>() - 0.5).collect();
            similarity::l2_normalize(&mut plane);
            planes.push(plane);
        }
        Ok(Self { planes })
    }

    /// Build a set from explicit planes. The planes are used as given, without
    /// re-normalization.
    pub fn from_planes(planes: Vec<Vec<f64>>) -> Result<Self> {
        if planes.is_empty() {
            return Err(LshError::InvalidNumHyperplanes);
        }
        if planes.len() > MAX_HASH_BITS {
            return Err(LshError::NumHyperplanesExceedHashBits);
        }
        let vec_len = planes[0].len();
        if vec_len < 1 {
            return Err(LshError::InvalidVectorLength);
        }
        for p in &planes {
            if p.len() != vec_len {
                return Err(LshError::VectorLengthMismatch {
                    got: p.len(),
                    want: vec_len,
                });
            }
        }
        Ok(Self { planes })
    }

    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    pub fn vector_length(&self) -> usize {
        self.planes[0].len()
    }

    pub fn planes(&self) -> &[Vec<f64>] {
        &self.planes
    }

    /// 8-bit bucket code, for plane counts up to 8.
    pub fn hash8(&self, v: &[f64]) -> Result<u8> {
        let mut buffer = [0u8; 1];
        self.hash_into(v, &mut buffer, 8)?;
        Ok(buffer[0])
    }

    /// 16-bit bucket code, for plane counts up to 16.
    pub fn hash16(&self, v: &[f64]) -> Result<u16> {
        let mut buffer = [0u8; 2];
        self.hash_into(v, &mut buffer, 16)?;
        Ok(u16::from_be_bytes(buffer))
    }

    /// 32-bit bucket code, for plane counts up to 32.
    pub fn hash32(&self, v: &[f64]) -> Result<u32> {
        let mut buffer = [0u8; 4];
        self.hash_into(v, &mut buffer, 32)?;
        Ok(u32::from_be_bytes(buffer))
    }

    /// 64-bit bucket code, for plane counts up to 64.
    pub fn hash64(&self, v: &[f64]) -> Result<u64> {
        let mut buffer = [0u8; 8];
        self.hash_into(v, &mut buffer, 64)?;
        Ok(u64::from_be_bytes(buffer))
    }

    fn hash_into(&self, v: &[f64], buffer: &mut [u8], width: usize) -> Result<()> {
        if v.is_empty() {
            return Err(LshError::NoVector);
        }
        if self.planes.len() > width {
            return Err(LshError::NumHyperplanesExceedHashBits);
        }
        for (k, p) in self.planes.iter().enumerate() {
            if v.len() != p.len() {
                return Err(LshError::VectorLengthMismatch {
                    got: v.len(),
                    want: p.len(),
                });
            }
            if similarity::dot(p, v) > 0.0 {
                buffer[k / 8] |= 1 << (7 - (k % 8));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn axis_planes() -> Hyperplanes {
        Hyperplanes::from_planes(vec![
            vec![0.0, 0.0, 1.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn new_validates_arguments() {
        assert_eq!(
            Hyperplanes::new(0, 3).unwrap_err(),
            LshError::InvalidNumHyperplanes
        );
        assert_eq!(
            Hyperplanes::new(17, 3).unwrap_err(),
            LshError::ExceededMaxNumHyperplanes
        );
        assert_eq!(
            Hyperplanes::new(8, 0).unwrap_err(),
            LshError::InvalidVectorLength
        );
    }

    #[test]
    fn planes_are_unit_norm() {
        let mut rng = StdRng::seed_from_u64(42);
        let h = Hyperplanes::with_rng(16, 24, &mut rng).unwrap();
        for p in h.planes() {
            assert!((similarity::norm(p) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn hash8_packs_msb_first() {
        let h = axis_planes();
        assert_eq!(h.hash8(&[0.0, 0.0, 1.0]).unwrap(), 128);
        assert_eq!(h.hash8(&[0.0, 1.0, 0.0]).unwrap(), 64);
        assert_eq!(h.hash8(&[1.0, 0.0, 0.0]).unwrap(), 32);
        assert_eq!(h.hash8(&[0.3, 0.3, 0.3]).unwrap(), 224);
        assert_eq!(h.hash8(&[-0.3, -0.3, -0.3]).unwrap(), 0);
        // exactly-zero projections map to 0
        assert_eq!(h.hash8(&[0.0, 0.0, -1.0]).unwrap(), 0);
    }

    #[test]
    fn wider_hashes_shift_into_high_bits() {
        let h = axis_planes();
        let v = [0.3, 0.3, 0.3];
        assert_eq!(h.hash16(&v).unwrap(), 0xE000);
        assert_eq!(h.hash16(&[0.0, 0.0, 1.0]).unwrap(), 0x8000);
        assert_eq!(h.hash16(&[0.0, 1.0, 0.0]).unwrap(), 0x4000);
        assert_eq!(h.hash16(&[1.0, 0.0, 0.0]).unwrap(), 0x2000);
        assert_eq!(h.hash32(&v).unwrap(), 0xE000_0000);
        assert_eq!(h.hash64(&v).unwrap(), 0xE000_0000_0000_0000);
    }

    #[test]
    fn hash_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let h = Hyperplanes::with_rng(16, 10, &mut rng).unwrap();
        let v: Vec<f64> = (0..10).map(|i| (i as f64 * 0.37).sin()).collect();
        let first = h.hash16(&v).unwrap();
        for _ in 0..10 {
            assert_eq!(h.hash16(&v).unwrap(), first);
        }
    }

    #[test]
    fn hash_rejects_bad_input() {
        let h = axis_planes();
        assert_eq!(h.hash16(&[]).unwrap_err(), LshError::NoVector);
        assert_eq!(
            h.hash16(&[1.0, 2.0]).unwrap_err(),
            LshError::VectorLengthMismatch { got: 2, want: 3 }
        );
    }

    #[test]
    fn narrow_hash_rejects_too_many_planes() {
        let planes: Vec<Vec<f64>> = (0..9)
            .map(|i| {
                let mut p = vec![0.0; 9];
                p[i] = 1.0;
                p
            })
            .collect();
        let h = Hyperplanes::from_planes(planes).unwrap();
        assert_eq!(
            h.hash8(&[1.0; 9]).unwrap_err(),
            LshError::NumHyperplanesExceedHashBits
        );
        assert_eq!(h.hash16(&[1.0; 9]).unwrap(), 0xFF80);
    }
}
