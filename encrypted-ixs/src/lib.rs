use arcis::*;

#[encrypted]
mod circuits {
    use arcis::*;

    /// Reveal the batch average posted by the coprocessor.
    ///
    /// The aggregate arrives encrypted under the MXE key, read straight from the
    /// sealed slot account. Only the average is revealed, never an individual score.
    #[instruction]
    pub fn reveal_aggregate(aggregate_ctxt: Enc<Mxe, u64>) -> u64 {
        let aggregate = aggregate_ctxt.to_arcis();
        aggregate.reveal()
    }
}
