//! # Memory Tape
//!
//! The VM's linear memory: signed integer cells addressed from zero, with a
//! cursor that doubles as the instruction pointer. Any access beyond the
//! current end grows the tape with zero cells; negative addresses are fatal.
//! A tape is owned by exactly one engine and mutated in place as it runs.

use crate::error::{self, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// The VM's growable integer memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<i64>,
    position: usize,
}

impl Tape {
    /// Create a tape from pre-parsed cells, cursor at zero
    pub fn new(cells: Vec<i64>) -> Self {
        Tape { cells, position: 0 }
    }

    /// Load a tape from the first line of a program file.
    ///
    /// Program files carry one line of comma-separated signed decimal
    /// integers; anything after the first line is ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            error::program_unreadable(path).set_source(e)
        })?;

        let line = text
            .lines()
            .next()
            .ok_or_else(|| error::program_unreadable(path))?;

        line.parse()
    }

    /// Number of cells currently on the tape
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the tape has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Read the cell at `addr`.
    ///
    /// Reading past the end grows the tape with zero cells through `addr`;
    /// that growth is normal operation, not an error. Negative addresses
    /// fail with `AddressNegative` and leave the tape untouched.
    pub fn read(&mut self, addr: i64) -> Result<i64> {
        let addr = self.check_address(addr).map_err(|e| e.with_operation("tape::read"))?;
        self.grow_to(addr);
        Ok(self.cells[addr])
    }

    /// Write `value` to the cell at `addr`, growing the tape as for `read`.
    pub fn write(&mut self, addr: i64, value: i64) -> Result<()> {
        let addr = self.check_address(addr).map_err(|e| e.with_operation("tape::write"))?;
        self.grow_to(addr);
        self.cells[addr] = value;
        Ok(())
    }

    /// Read the cell at the cursor, then advance the cursor by one.
    ///
    /// Used both for instruction fetch and for in-line operand reads. The
    /// cursor cannot be negative, so this never fails; running off the end
    /// just reads freshly grown zeros.
    pub fn next(&mut self) -> i64 {
        self.grow_to(self.position);
        let value = self.cells[self.position];
        self.position += 1;
        value
    }

    /// Reposition the cursor.
    ///
    /// A non-negative `addr` is absolute; a negative `addr` moves the cursor
    /// backwards relative to its current position. A relative move past the
    /// start of the tape fails with `AddressNegative`.
    pub fn seek(&mut self, addr: i64) -> Result<usize> {
        if addr >= 0 {
            self.position = addr as usize;
        } else {
            let target = self.position as i64 + addr;
            if target < 0 {
                return Err(error::address_negative(target).with_operation("tape::seek"));
            }
            self.position = target as usize;
        }
        Ok(self.position)
    }

    /// Reset the cursor to the start of the tape
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Append integer cells at the end of the tape
    pub fn append(&mut self, values: impl IntoIterator<Item = i64>) {
        self.cells.extend(values);
    }

    /// Append cells converted from arbitrary items.
    ///
    /// Used to push generated command streams onto a tape, e.g. ASCII
    /// characters of a movement routine: `tape.append_with(line.chars(), |c| c as i64)`.
    pub fn append_with<T, I, F>(&mut self, values: I, mut convert: F)
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> i64,
    {
        self.cells.extend(values.into_iter().map(&mut convert));
    }

    /// Overwrite cells 1 and 2 (the legacy noun/verb program configuration)
    pub fn patch(&mut self, noun: i64, verb: i64) {
        self.grow_to(2);
        self.cells[1] = noun;
        self.cells[2] = verb;
    }

    /// Validate an address, converting it to an index
    fn check_address(&self, addr: i64) -> Result<usize> {
        if addr < 0 {
            return Err(error::address_negative(addr));
        }
        Ok(addr as usize)
    }

    /// Grow the tape with zero cells through `addr`
    fn grow_to(&mut self, addr: usize) {
        if addr >= self.cells.len() {
            self.cells.resize(addr + 1, 0);
        }
    }
}

impl FromStr for Tape {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut cells = Vec::new();
        for (index, token) in s.trim().split(',').enumerate() {
            let token = token.trim();
            let value = token.parse::<i64>().map_err(|e| {
                error::tape_parse(token, index).set_source(e)
            })?;
            cells.push(value);
        }
        Ok(Tape::new(cells))
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write as _;

    #[test]
    fn test_parse() {
        let tape: Tape = "1,0,0,3,99".parse().unwrap();
        assert_eq!(tape.len(), 5);
        assert_eq!(tape.position(), 0);
        assert_eq!(tape.to_string(), "1,0,0,3,99");
    }

    #[test]
    fn test_parse_negative_values() {
        let tape: Tape = "109,-1,204,-34".parse().unwrap();
        assert_eq!(tape.to_string(), "109,-1,204,-34");
    }

    #[test]
    fn test_parse_bad_token() {
        let err = "1,2,x,4".parse::<Tape>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);
        assert!(err.stage().is_load());
        assert!(err.context().iter().any(|(k, v)| *k == "token" && v == "x"));
    }

    #[test]
    fn test_read_extends_with_zeros() {
        let mut tape: Tape = "1,2,3".parse().unwrap();
        assert_eq!(tape.read(10).unwrap(), 0);
        assert_eq!(tape.len(), 11);
        // previously written cells survive the growth
        assert_eq!(tape.read(0).unwrap(), 1);
        assert_eq!(tape.read(2).unwrap(), 3);
    }

    #[test]
    fn test_write_read_round_trip() {
        let mut tape = Tape::default();
        tape.write(7, 42).unwrap();
        assert_eq!(tape.read(7).unwrap(), 42);
        assert_eq!(tape.read(6).unwrap(), 0);
    }

    #[test]
    fn test_negative_address_fails_without_mutation() {
        let mut tape: Tape = "1,2,3".parse().unwrap();
        let err = tape.read(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AddressNegative);

        let err = tape.write(-5, 9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AddressNegative);

        assert_eq!(tape.to_string(), "1,2,3");
    }

    #[test]
    fn test_next_advances() {
        let mut tape: Tape = "10,20,30".parse().unwrap();
        assert_eq!(tape.next(), 10);
        assert_eq!(tape.next(), 20);
        assert_eq!(tape.position(), 2);
    }

    #[test]
    fn test_next_past_end_reads_zero() {
        let mut tape: Tape = "5".parse().unwrap();
        assert_eq!(tape.next(), 5);
        assert_eq!(tape.next(), 0);
        assert_eq!(tape.len(), 2);
    }

    #[test]
    fn test_seek_absolute_and_relative() {
        let mut tape: Tape = "1,2,3,4".parse().unwrap();
        assert_eq!(tape.seek(3).unwrap(), 3);
        assert_eq!(tape.seek(-2).unwrap(), 1);
        assert_eq!(tape.position(), 1);
    }

    #[test]
    fn test_seek_before_start_fails() {
        let mut tape: Tape = "1,2,3".parse().unwrap();
        tape.seek(1).unwrap();
        let err = tape.seek(-2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AddressNegative);
    }

    #[test]
    fn test_rewind() {
        let mut tape: Tape = "1,2,3".parse().unwrap();
        tape.next();
        tape.next();
        tape.rewind();
        assert_eq!(tape.position(), 0);
    }

    #[test]
    fn test_append() {
        let mut tape: Tape = "1,2".parse().unwrap();
        tape.append([3, 4]);
        assert_eq!(tape.to_string(), "1,2,3,4");
    }

    #[test]
    fn test_append_with_ascii() {
        let mut tape = Tape::default();
        tape.append_with("A,B\n".chars(), |c| c as i64);
        assert_eq!(tape.to_string(), "65,44,66,10");
    }

    #[test]
    fn test_patch() {
        let mut tape: Tape = "1,0,0,0,99".parse().unwrap();
        tape.patch(12, 2);
        assert_eq!(tape.to_string(), "1,12,2,0,99");
    }

    #[test]
    fn test_patch_grows_short_tape() {
        let mut tape: Tape = "99".parse().unwrap();
        tape.patch(5, 6);
        assert_eq!(tape.to_string(), "99,5,6");
    }

    #[test]
    fn test_from_file_reads_first_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1,9,10,3,2,3,11,0,99,30,40,50").unwrap();
        writeln!(file, "this trailing line is ignored").unwrap();

        let tape = Tape::from_file(file.path()).unwrap();
        assert_eq!(tape.len(), 12);
        assert_eq!(tape.to_string(), "1,9,10,3,2,3,11,0,99,30,40,50");
    }

    #[test]
    fn test_from_file_missing() {
        let err = Tape::from_file("/nonexistent/program.txt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailed);
        assert!(err.stage().is_load());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original: Tape = "1,0,0,0,99".parse().unwrap();
        let mut copy = original.clone();
        copy.write(0, 77).unwrap();
        assert_eq!(original.read(0).unwrap(), 1);
        assert_eq!(copy.read(0).unwrap(), 77);
    }
}
