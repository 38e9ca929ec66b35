// Module audio - Buffers, sortie CPAL et export WAV

pub mod buffer;
pub mod export;
pub mod sink;
