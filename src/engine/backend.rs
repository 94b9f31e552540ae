//! Instruction-set backends.
//!
//! Every core is written once, generic over a [`Backend`]. A backend fixes
//! the lane width the block loops are chunked by, so the compiler can keep
//! each chunk in one vector register for the target it was selected for.
//!
//! ```text
//!   detect() ──→ InstructionSet ──→ factory ──→ Core<Avx2> (LANES = 8)
//!                                          └──→ Core<Scalar> (LANES = 1)
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstructionSet {
    Scalar,
    Sse2,
    Sse41,
    Avx2,
    Avx512,
}

impl InstructionSet {
    /// Fastest first.
    pub const ALL: [InstructionSet; 5] = [
        InstructionSet::Avx512,
        InstructionSet::Avx2,
        InstructionSet::Sse41,
        InstructionSet::Sse2,
        InstructionSet::Scalar,
    ];

    pub fn lanes(self) -> usize {
        match self {
            InstructionSet::Scalar => Scalar::LANES,
            InstructionSet::Sse2 => Sse2::LANES,
            InstructionSet::Sse41 => Sse41::LANES,
            InstructionSet::Avx2 => Avx2::LANES,
            InstructionSet::Avx512 => Avx512::LANES,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InstructionSet::Scalar => "scalar",
            InstructionSet::Sse2 => "SSE2",
            InstructionSet::Sse41 => "SSE4.1",
            InstructionSet::Avx2 => "AVX2",
            InstructionSet::Avx512 => "AVX512",
        }
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    pub fn is_supported(self) -> bool {
        match self {
            InstructionSet::Scalar => true,
            InstructionSet::Sse2 => is_x86_feature_detected!("sse2"),
            InstructionSet::Sse41 => is_x86_feature_detected!("sse4.1"),
            InstructionSet::Avx2 => is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma"),
            InstructionSet::Avx512 => is_x86_feature_detected!("avx512f"),
        }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    pub fn is_supported(self) -> bool {
        self == InstructionSet::Scalar
    }

    /// Best set the running CPU supports.
    pub fn detect() -> Self {
        Self::ALL
            .into_iter()
            .find(|set| set.is_supported())
            .unwrap_or(InstructionSet::Scalar)
    }
}

impl fmt::Display for InstructionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lane-chunked buffer arithmetic used by the block loops.
pub trait Backend: Send + 'static {
    const SET: InstructionSet;
    const LANES: usize;

    /// `dst[i] += src[i]`
    #[inline]
    fn accumulate(dst: &mut [f32], src: &[f32]) {
        let len = dst.len().min(src.len());
        let (dst, src) = (&mut dst[..len], &src[..len]);
        let split = len - len % Self::LANES;

        for (d, s) in dst[..split]
            .chunks_exact_mut(Self::LANES)
            .zip(src[..split].chunks_exact(Self::LANES))
        {
            for (d, s) in d.iter_mut().zip(s) {
                *d += *s;
            }
        }
        for (d, s) in dst[split..].iter_mut().zip(&src[split..]) {
            *d += *s;
        }
    }

    /// `dst[i] *= gain[i]`
    #[inline]
    fn multiply(dst: &mut [f32], gain: &[f32]) {
        let len = dst.len().min(gain.len());
        let (dst, gain) = (&mut dst[..len], &gain[..len]);
        let split = len - len % Self::LANES;

        for (d, g) in dst[..split]
            .chunks_exact_mut(Self::LANES)
            .zip(gain[..split].chunks_exact(Self::LANES))
        {
            for (d, g) in d.iter_mut().zip(g) {
                *d *= *g;
            }
        }
        for (d, g) in dst[split..].iter_mut().zip(&gain[split..]) {
            *d *= *g;
        }
    }

    /// Replaces non-finite samples with silence.
    #[inline]
    fn sanitize(dst: &mut [f32]) {
        for chunk in dst.chunks_mut(Self::LANES) {
            for x in chunk {
                if !x.is_finite() {
                    *x = 0.0;
                }
            }
        }
    }
}

macro_rules! backend {
    ($name:ident, $set:expr, $lanes:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Backend for $name {
            const SET: InstructionSet = $set;
            const LANES: usize = $lanes;
        }
    };
}

backend!(Scalar, InstructionSet::Scalar, 1);
backend!(Sse2, InstructionSet::Sse2, 4);
backend!(Sse41, InstructionSet::Sse41, 4);
backend!(Avx2, InstructionSet::Avx2, 8);
backend!(Avx512, InstructionSet::Avx512, 16);
