use rand::Rng;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Everything the VM needs from the outside world.
pub trait Host {
    /// Emits program output in order.
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    /// Blocks until one line of input is available. The content is dropped.
    fn read_line(&mut self) -> io::Result<()>;

    /// Returns a uniformly distributed value in `[0, bound)`.
    fn random_below(&mut self, bound: i64) -> i64;

    fn sleep(&mut self, duration: Duration);
}

/// Host backed by the process: stdout, stdin, the thread RNG and a real sleep.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }

    fn read_line(&mut self) -> io::Result<()> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }

    fn random_below(&mut self, bound: i64) -> i64 {
        rand::thread_rng().gen_range(0..bound)
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// In-memory host: collects output, serves scripted input, replays a fixed
/// random sequence and records sleeps instead of performing them.
#[derive(Debug, Default)]
pub struct BufferedHost {
    pub output: String,
    pub input: VecDeque<String>,
    pub lines_read: usize,
    pub randoms: VecDeque<i64>,
    pub sleeps: Vec<Duration>,
}

impl BufferedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_randoms<I: IntoIterator<Item = i64>>(mut self, values: I) -> Self {
        self.randoms.extend(values);
        self
    }
}

impl Host for BufferedHost {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    /// Running out of scripted input behaves like end of file.
    fn read_line(&mut self) -> io::Result<()> {
        if self.input.pop_front().is_some() {
            self.lines_read += 1;
        }
        Ok(())
    }

    /// Replays the scripted values (reduced into range), then yields zeros.
    fn random_below(&mut self, bound: i64) -> i64 {
        self.randoms
            .pop_front()
            .map_or(0, |value| value.rem_euclid(bound))
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
