use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};

/// Raw mode plus the alternate screen for as long as the guard lives. Dropping
/// it restores the terminal, including while unwinding from a panic.
pub struct TerminalGuard<W: Write> {
    out: W,
}

impl<W: Write> TerminalGuard<W> {
    pub fn enter(out: W) -> io::Result<Self> {
        enable_raw_mode()?;
        // Built before the alternate screen so a failure below still leaves raw mode.
        let mut guard = Self { out };
        execute!(guard.out, EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        restore(&mut self.out);
    }
}

fn restore(out: &mut impl Write) {
    let _ = disable_raw_mode();
    let _ = execute!(out, LeaveAlternateScreen, Show);
}

/// Restores the terminal before the panic message is printed, so it does not
/// land on the alternate screen.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore(&mut io::stdout());
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn written(buf: &SharedBuf) -> String {
        String::from_utf8(buf.0.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_drop_leaves_alternate_screen() {
        let buf = SharedBuf::default();
        drop(TerminalGuard { out: buf.clone() });

        let out = written(&buf);
        assert!(out.contains("\x1b[?1049l"));
        assert!(out.contains("\x1b[?25h"));
    }

    #[test]
    fn test_panic_still_restores_terminal() {
        let buf = SharedBuf::default();
        let out = buf.clone();

        let result = std::panic::catch_unwind(move || {
            let _guard = TerminalGuard { out };
            panic!("dashboard crashed");
        });

        assert!(result.is_err());
        assert!(written(&buf).contains("\x1b[?1049l"));
    }
}
