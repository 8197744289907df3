mod savitzky_golay;

pub use savitzky_golay::{
    smooth, term_count, BorderRegion, Factorization, KernelSolver, KernelWeights, SavitzkyGolay,
    KERNEL_ALIGN,
};
