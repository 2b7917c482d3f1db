//! A from-scratch MT19937 Mersenne-Twister, seeded deterministically, used
//! by [`titr_mc`] as its injected RNG. Implements [`rand::RngCore`] so it
//! composes with the wider `rand` ecosystem (`rand::Rng::random`, etc.)
//! the way any other generator in that ecosystem would.

mod mt19937;

pub use mt19937::Mt19937;
