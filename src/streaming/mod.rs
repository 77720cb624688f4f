// Streaming response consumption
//
// Turns the ordered fragments of one chat completion into live terminal
// output plus a single finished answer.

mod assembler;

pub use assembler::{stream_answer, AssemblerState, FinishedAnswer, StreamingAnswerAssembler};
