// Format conversion for CPAL audio streams
//
// The voice pool renders stereo f32 frames; the device may want f32, i16 or u16.
// Conversion goes through CPAL's `FromSample<f32>` and never allocates.

use cpal::{FromSample, Sample};

/// Write a stereo frame into an interleaved output frame
///
/// Extra channels are silenced; a mono device gets the L/R average.
#[inline]
pub fn write_stereo_to_interleaved_frame<T>(
    (left_sample, right_sample): (f32, f32),
    output_frame: &mut [T],
) where
    T: Sample + FromSample<f32>,
{
    if output_frame.len() >= 2 {
        output_frame[0] = Sample::from_sample::<f32>(left_sample);
        output_frame[1] = Sample::from_sample::<f32>(right_sample);
        for channel_sample in output_frame.iter_mut().skip(2) {
            *channel_sample = Sample::from_sample::<f32>(0.0);
        }
    } else if let Some(channel_sample) = output_frame.first_mut() {
        let mono_sample = (left_sample + right_sample) * 0.5;
        *channel_sample = Sample::from_sample::<f32>(mono_sample);
    }
}
