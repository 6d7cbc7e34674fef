// Licensed under the Apache-2.0 license

use super::vectors::VECTORS;
use crate::platform::{ClockGate, HwMutex};
use crate::registers::ShaRegisters;
use crate::sha::{EngineMode, LockOutcome, ShaAlgo, ShaContext, ShaEngine};
use embedded_io::{Write, WriteFmtError};

/// Runs the engine checks and returns how many failed.
///
/// # Errors
/// Only console write failures are reported as errors.
pub fn run_engine_tests<W, R, C, M>(
    uart: &mut W,
    engine: &ShaEngine<R, C, M>,
) -> Result<usize, WriteFmtError<W::Error>>
where
    W: Write,
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    writeln!(uart, "\r\n=== SHA Engine Tests ===\r")?;

    let results = [
        report(uart, "known answers on the engine", test_known_answers(engine, false))?,
        report(uart, "known answers in software", test_known_answers(engine, true))?,
        report(uart, "engine arbitration", test_arbitration(engine))?,
        report(uart, "clock refcount balance", test_clock_balance(engine))?,
        report(uart, "mixed-path digests agree", test_mixed_paths(engine))?,
    ];

    let failures = results.iter().filter(|passed| !**passed).count();
    if failures == 0 {
        writeln!(uart, "\r\n=== All SHA Engine Tests Passed ===\r")?;
    } else {
        writeln!(uart, "\r\n=== {failures} SHA Engine Tests FAILED ===\r")?;
    }
    Ok(failures)
}

fn report<W: Write>(
    uart: &mut W,
    name: &str,
    passed: bool,
) -> Result<bool, WriteFmtError<W::Error>> {
    write!(uart, "Testing {name}... ")?;
    writeln!(uart, "{}\r", if passed { "PASSED" } else { "FAILED" })?;
    Ok(passed)
}

fn test_known_answers<R, C, M>(engine: &ShaEngine<R, C, M>, software: bool) -> bool
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    VECTORS.iter().all(|v| {
        let mut hasher = if software {
            engine.software_hasher(v.algo)
        } else {
            engine.hasher(v.algo)
        };
        let result = hasher.update(v.message).and_then(|()| hasher.finalize());
        match result {
            Ok(digest) if digest.as_slice() == v.digest => true,
            Ok(_) => {
                log::error!("{:?} digest mismatch", v.algo);
                false
            }
            Err(err) => {
                log::error!("{:?} failed: {err}", v.algo);
                false
            }
        }
    })
}

fn test_arbitration<R, C, M>(engine: &ShaEngine<R, C, M>) -> bool
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    let mut first = ShaContext::new(ShaAlgo::Sha256);
    let mut second = ShaContext::new(ShaAlgo::Sha512);

    let first_outcome = engine.try_lock(&mut first);
    let second_outcome = engine.try_lock(&mut second);
    let repeat = engine.try_lock(&mut first);

    engine.unlock(&mut second);
    engine.unlock(&mut first);

    first_outcome == Ok(LockOutcome::Hardware)
        && second_outcome == Ok(LockOutcome::Software)
        && repeat.is_err()
        && first.mode() == EngineMode::Uninitialized
        && !first.holds_engine()
}

fn test_clock_balance<R, C, M>(engine: &ShaEngine<R, C, M>) -> bool
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    let before = engine.clock().is_enabled();
    let digest = engine.digest(ShaAlgo::Sha1, b"abc");
    digest.is_ok() && engine.clock().is_enabled() == before
}

fn test_mixed_paths<R, C, M>(engine: &ShaEngine<R, C, M>) -> bool
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    let mut message = [0u8; 777];
    for (i, byte) in message.iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }

    [ShaAlgo::Sha1, ShaAlgo::Sha256, ShaAlgo::Sha384, ShaAlgo::Sha512]
        .into_iter()
        .all(|algo| {
            // hardware holder and software contender run interleaved
            let mut hw = engine.hasher(algo);
            let mut sw = engine.hasher(algo);
            let fed = message
                .chunks(100)
                .all(|chunk| hw.update(chunk).is_ok() && sw.update(chunk).is_ok());
            let on_engine = hw.context().is_hardware();
            let in_software = sw.context().mode() == EngineMode::Software;
            match (fed, hw.finalize(), sw.finalize()) {
                (true, Ok(a), Ok(b)) => on_engine && in_software && a == b,
                _ => false,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockClock, MockMutex, MockSha};
    use crate::sha::EngineConfig;

    struct Console(heapless::String<2048>);

    impl embedded_io::ErrorType for Console {
        type Error = embedded_io::ErrorKind;
    }

    impl Write for Console {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            let text =
                core::str::from_utf8(buf).map_err(|_| embedded_io::ErrorKind::InvalidData)?;
            self.0
                .push_str(text)
                .map_err(|()| embedded_io::ErrorKind::OutOfMemory)?;
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn suite_passes_against_mock_engine() {
        let engine = ShaEngine::new(
            MockSha::with_busy_latency(1),
            MockClock::with_count(1),
            MockMutex::new(),
            EngineConfig::default(),
        );
        let mut console = Console(heapless::String::new());

        let failures = run_engine_tests(&mut console, &engine).unwrap();
        assert_eq!(failures, 0, "{}", console.0);
        assert!(console.0.contains("Testing engine arbitration... PASSED"));
        assert!(console.0.contains("All SHA Engine Tests Passed"));
        assert_eq!(engine.clock().count(), 1);
    }
}
