//! ChampSim trace reader.
//!
//! Decompresses an xz trace on a background thread and hands fixed-size
//! batches of decoded instructions to the simulation loop over a bounded
//! channel. The trace rewinds at EOF so runs longer than the trace keep
//! replaying it.

use std::{
    fs,
    io::{self, Read, Seek},
    path::PathBuf,
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Receiver, Sender};
use xz2::read::XzDecoder;

const NUM_INSTR_DESTINATIONS: usize = 2;
const NUM_INSTR_SOURCES: usize = 4;

/// On-disk record size: ip (8) + branch flags (2) + register ids (2 + 4) +
/// destination addresses (16) + source addresses (32).
const INSTR_SIZE: usize = 64;

/// One decoded trace instruction.
#[derive(Default, Clone, Copy, Debug)]
pub struct Instr {
    pub ip: u64,

    pub is_branch: u8,
    pub branch_taken: u8,

    pub destination_registers: [u8; NUM_INSTR_DESTINATIONS],
    pub source_registers: [u8; NUM_INSTR_SOURCES],

    pub destination_memory: [u64; NUM_INSTR_DESTINATIONS],
    pub source_memory: [u64; NUM_INSTR_SOURCES],
}

impl Instr {
    /// Every address this instruction touches: the fetch address plus any
    /// non-zero source and destination memory operands.
    pub fn addresses(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.ip as usize)
            .chain(
                self.source_memory
                    .iter()
                    .map(|&addr| addr as usize)
                    .filter(|&addr| addr != 0),
            )
            .chain(
                self.destination_memory
                    .iter()
                    .map(|&addr| addr as usize)
                    .filter(|&addr| addr != 0),
            )
    }

    /// Decode one little-endian `INSTR_SIZE`-byte record.
    fn parse(raw: &[u8]) -> Instr {
        let u64_at = |off: usize| u64::from_le_bytes(raw[off..off + 8].try_into().unwrap());

        let mut instr = Instr {
            ip: u64_at(0),
            is_branch: raw[8],
            branch_taken: raw[9],
            ..Instr::default()
        };
        instr.destination_registers.copy_from_slice(&raw[10..12]);
        instr.source_registers.copy_from_slice(&raw[12..16]);
        for (i, slot) in instr.destination_memory.iter_mut().enumerate() {
            *slot = u64_at(16 + 8 * i);
        }
        for (i, slot) in instr.source_memory.iter_mut().enumerate() {
            *slot = u64_at(32 + 8 * i);
        }
        instr
    }
}

pub struct Trace {
    pub rec: Receiver<Vec<Instr>>,
    _thread: JoinHandle<()>,
}

impl Trace {
    pub fn read(
        path: PathBuf,
        instr_per_block: usize,
        blocks_per_queue: usize,
    ) -> io::Result<Trace> {
        let stream = fs::File::open(path)?;
        let (sender, receiver) = crossbeam::channel::bounded(blocks_per_queue);

        let t = thread::spawn(move || Trace::run_thread(stream, instr_per_block, sender));

        Ok(Trace {
            rec: receiver,
            _thread: t,
        })
    }

    fn run_thread(stream: fs::File, instr_per_block: usize, queue: Sender<Vec<Instr>>) {
        let mut xz_stream = XzDecoder::new(stream);
        let mut raw = vec![0u8; instr_per_block * INSTR_SIZE];
        loop {
            loop {
                let n = read_fill(&mut xz_stream, &mut raw);
                if n == 0 {
                    break;
                }
                assert_eq!(n % INSTR_SIZE, 0, "truncated trace record");
                let buffer: Vec<Instr> = raw[..n].chunks_exact(INSTR_SIZE).map(Instr::parse).collect();
                // The receiver hanging up is the normal shutdown path.
                if queue.send(buffer).is_err() {
                    return;
                }
            }

            // Out of trace; rewind and decode it again.
            let mut stream = xz_stream.into_inner();
            stream.seek(io::SeekFrom::Start(0)).unwrap();
            xz_stream = XzDecoder::new(stream);
        }
    }
}

/// Read until `buf` is full or the stream ends; returns the bytes read.
fn read_fill(reader: &mut impl Read, buf: &mut [u8]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => panic!("trace read failed: {err}"),
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_record_field_wise() {
        let mut raw = [0u8; INSTR_SIZE];
        raw[..8].copy_from_slice(&0x4000_1234u64.to_le_bytes());
        raw[8] = 1;
        raw[9] = 0;
        raw[10] = 7; // first destination register
        raw[12] = 3; // first source register
        raw[16..24].copy_from_slice(&0xdead_0000u64.to_le_bytes());
        raw[32..40].copy_from_slice(&0xbeef_0000u64.to_le_bytes());

        let instr = Instr::parse(&raw);
        assert_eq!(instr.ip, 0x4000_1234);
        assert_eq!(instr.is_branch, 1);
        assert_eq!(instr.destination_registers[0], 7);
        assert_eq!(instr.source_registers[0], 3);
        assert_eq!(instr.destination_memory, [0xdead_0000, 0]);
        assert_eq!(instr.source_memory, [0xbeef_0000, 0, 0, 0]);
    }

    #[test]
    fn addresses_skip_zero_operands() {
        let instr = Instr {
            ip: 0x1000,
            source_memory: [0x2000, 0, 0, 0x3000],
            destination_memory: [0, 0x4000],
            ..Instr::default()
        };
        let addrs: Vec<usize> = instr.addresses().collect();
        assert_eq!(addrs, vec![0x1000, 0x2000, 0x3000, 0x4000]);
    }
}
