//! Layout and operation flags, and the options record that bundles them.

/// Memory order of a matrix operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// C order: the column index varies fastest.
    #[default]
    RowMajor,
    /// Fortran order: the row index varies fastest.
    ColMajor,
}

/// `op(A)` selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transpose {
    #[default]
    NoTrans,
    Trans,
    ConjTrans,
}

impl Transpose {
    #[inline]
    pub fn to_char(self) -> u8 {
        match self {
            Transpose::NoTrans => b'N',
            Transpose::Trans => b'T',
            Transpose::ConjTrans => b'C',
        }
    }

    /// `NoTrans <-> Trans`; `ConjTrans` is kept.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Transpose::NoTrans => Transpose::Trans,
            Transpose::Trans => Transpose::NoTrans,
            Transpose::ConjTrans => Transpose::ConjTrans,
        }
    }

    /// `NoTrans <-> ConjTrans`, used by the Hermitian rank-k updates.
    #[inline]
    pub fn flip_conj(self) -> Self {
        match self {
            Transpose::NoTrans => Transpose::ConjTrans,
            _ => Transpose::NoTrans,
        }
    }

    #[inline]
    pub fn is_transposed(self) -> bool {
        self != Transpose::NoTrans
    }
}

/// Which triangle of a symmetric, Hermitian or triangular matrix is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpLo {
    #[default]
    Upper,
    Lower,
}

impl UpLo {
    #[inline]
    pub fn to_char(self) -> u8 {
        match self {
            UpLo::Upper => b'U',
            UpLo::Lower => b'L',
        }
    }

    #[inline]
    pub fn flip(self) -> Self {
        match self {
            UpLo::Upper => UpLo::Lower,
            UpLo::Lower => UpLo::Upper,
        }
    }
}

/// Whether a triangular matrix has an implicit unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Diag {
    #[default]
    NonUnit,
    Unit,
}

impl Diag {
    #[inline]
    pub fn to_char(self) -> u8 {
        match self {
            Diag::NonUnit => b'N',
            Diag::Unit => b'U',
        }
    }
}

/// Side of the special operand in `symm`, `hemm`, `trmm` and `trsm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn to_char(self) -> u8 {
        match self {
            Side::Left => b'L',
            Side::Right => b'R',
        }
    }

    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Flags for one kernel call. Every routine reads only the fields it needs.
///
/// ```rust
/// use ndblas_kernel::{KernelOptions, Transpose, UpLo};
///
/// let opts = KernelOptions::new().trans(Transpose::ConjTrans).uplo(UpLo::Lower);
/// assert_eq!(opts.trans_b, Transpose::NoTrans);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KernelOptions {
    pub order: Order,
    pub trans: Transpose,
    pub trans_b: Transpose,
    pub uplo: UpLo,
    pub diag: Diag,
    pub side: Side,
}

impl KernelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn trans(mut self, trans: Transpose) -> Self {
        self.trans = trans;
        self
    }

    pub fn trans_b(mut self, trans: Transpose) -> Self {
        self.trans_b = trans;
        self
    }

    pub fn uplo(mut self, uplo: UpLo) -> Self {
        self.uplo = uplo;
        self
    }

    pub fn diag(mut self, diag: Diag) -> Self {
        self.diag = diag;
        self
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}
