/*!
This crate defines the [`StreamingMetric`](trait.StreamingMetric.html) trait and a number of concrete types that implement it, such as [`Accuracy`](struct.Accuracy.html) and [`MeanSquaredError`](struct.MeanSquaredError.html), along with batch convenience functions for when the entire input is available at once.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod accuracy;
mod mean;
mod mean_squared_error;

pub use self::accuracy::{accuracy, Accuracy};
pub use self::mean::Mean;
pub use self::mean_squared_error::{mean_squared_error, MeanSquaredError};

/**
The `StreamingMetric` trait defines a common interface to metrics that can be computed in a streaming manner, where the input is available in chunks.

After being initialized, a value implementing the `StreamingMetric` trait can have `update()` called on it with values of the associated type `Input`. Multiple values can be combined by calling `merge()`, which is useful when a metric is accumulated over separate partitions of the input. When finished aggregating, call `finalize()` to produce the associated type `Output`.
*/
pub trait StreamingMetric {
	type Input;
	type Output;
	fn update(&mut self, input: Self::Input);
	fn merge(&mut self, other: Self);
	fn finalize(self) -> Self::Output;
}
