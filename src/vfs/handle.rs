//! Cursor-based read and write views over a file's content.
//!
//! Any number of read handles may be open on a file at once, each with its
//! own cursor. At most one write handle may be open. A write through one
//! handle never repositions the cursor of another: a reader whose cursor now
//! points past the content simply reads nothing until it is moved back.
//!
//! Cursors count characters, not bytes.
//!
//! Using a closed handle is a programming error and panics.

use tracing::trace;

use crate::core::Result;
use crate::error::FsError;
use crate::vfs::File;

/// Cursor and registration state shared by both handle kinds.
#[derive(Debug)]
pub struct CursorState {
    file: File,
    cursor: usize,
    /// Registration id on the file; `None` while closed.
    id: Option<u64>,
}

impl CursorState {
    fn closed(file: &File) -> Self {
        Self {
            file: file.clone(),
            cursor: 0,
            id: None,
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::ReadHandle {}
    impl Sealed for super::WriteHandle {}
}

/// Capabilities common to read and write handles.
///
/// The trait is sealed: only [`ReadHandle`] and [`WriteHandle`] implement it.
///
/// ```compile_fail
/// use tree_vfs::{CursorState, Handle};
///
/// struct Unregistered(CursorState);
///
/// impl Handle for Unregistered {
///     fn state(&self) -> &CursorState { &self.0 }
///     fn state_mut(&mut self) -> &mut CursorState { &mut self.0 }
///     fn open(&mut self) -> tree_vfs::Result<()> { Ok(()) }
///     fn close(&mut self) {}
/// }
/// ```
pub trait Handle: sealed::Sealed {
    #[doc(hidden)]
    fn state(&self) -> &CursorState;
    #[doc(hidden)]
    fn state_mut(&mut self) -> &mut CursorState;

    /// Registers the handle on its file and resets the cursor to 0.
    fn open(&mut self) -> Result<()>;

    /// Unregisters the handle. Closing a closed handle does nothing.
    fn close(&mut self);

    fn file(&self) -> &File {
        &self.state().file
    }

    fn is_open(&self) -> bool {
        self.state().id.is_some()
    }

    fn cursor(&self) -> usize {
        self.state().cursor
    }

    /// Moves the cursor to `position`, which may be anywhere in
    /// `0..=len`. Returns false and leaves the cursor alone otherwise.
    fn move_cursor_abs(&mut self, position: usize) -> bool {
        ensure_open(self.state(), "move the cursor of");
        if position > self.file().len() {
            trace!(position, "cursor out of bounds");
            return false;
        }
        self.state_mut().cursor = position;
        true
    }

    /// Moves the cursor by `delta`. The result must lie in `0..len`: unlike
    /// an absolute move, a relative move cannot land on end-of-content.
    fn move_cursor_rel(&mut self, delta: isize) -> bool {
        ensure_open(self.state(), "move the cursor of");
        let len = self.file().len();
        match self.cursor().checked_add_signed(delta) {
            Some(position) if position < len => {
                self.state_mut().cursor = position;
                true
            }
            _ => {
                trace!(cursor = self.cursor(), delta, "cursor out of bounds");
                false
            }
        }
    }
}

fn ensure_open(state: &CursorState, action: &str) {
    if state.id.is_none() {
        panic!("cannot {action} a closed handle on {}", state.file.path());
    }
}

/// Byte offset of the `chars`-th character, clamped to the end of `s`.
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}

/// Read view over a file.
#[derive(Debug)]
pub struct ReadHandle {
    state: CursorState,
}

impl ReadHandle {
    /// Opens a new read handle on `file`. This always succeeds.
    pub fn open_on(file: &File) -> Self {
        let mut handle = Self {
            state: CursorState::closed(file),
        };
        handle.register();
        handle
    }

    fn register(&mut self) {
        let mut data = self.state.file.0.borrow_mut();
        let id = data.next_handle_id();
        data.readers.insert(id);
        self.state.id = Some(id);
        self.state.cursor = 0;
    }

    /// Returns up to `n` characters from the cursor and advances past them.
    pub fn read_next(&mut self, n: usize) -> String {
        ensure_open(&self.state, "read from");
        let (output, end) = {
            let data = self.state.file.0.borrow();
            let len = data.content.chars().count();
            let start = self.state.cursor.min(len);
            let end = start.saturating_add(n).min(len);
            let output: String = data.content.chars().skip(start).take(end - start).collect();
            (output, end)
        };
        self.state.cursor = end;
        output
    }

    /// Returns everything from the cursor on and moves the cursor to the end.
    pub fn read_to_end(&mut self) -> String {
        ensure_open(&self.state, "read from");
        let (output, len) = {
            let data = self.state.file.0.borrow();
            let len = data.content.chars().count();
            let start = byte_offset(&data.content, self.state.cursor);
            (data.content[start..].to_owned(), len)
        };
        self.state.cursor = len;
        output
    }

    /// Returns characters from the cursor up to and including the next
    /// newline, or up to the end. Empty once the cursor is at the end.
    pub fn read_line(&mut self) -> String {
        ensure_open(&self.state, "read from");
        let (output, end) = {
            let data = self.state.file.0.borrow();
            let len = data.content.chars().count();
            let start = self.state.cursor.min(len);
            let mut output = String::new();
            for c in data.content.chars().skip(start) {
                output.push(c);
                if c == '\n' {
                    break;
                }
            }
            let end = start + output.chars().count();
            (output, end)
        };
        self.state.cursor = end;
        output
    }

    /// Returns the whole content without moving the cursor.
    pub fn read(&self) -> String {
        ensure_open(&self.state, "read from");
        self.state.file.content()
    }
}

impl Handle for ReadHandle {
    fn state(&self) -> &CursorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CursorState {
        &mut self.state
    }

    fn open(&mut self) -> Result<()> {
        if self.is_open() {
            self.state.cursor = 0;
        } else {
            self.register();
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(id) = self.state.id.take() {
            self.state.file.0.borrow_mut().readers.remove(&id);
        }
    }
}

impl Drop for ReadHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Exclusive write view over a file.
#[derive(Debug)]
pub struct WriteHandle {
    state: CursorState,
}

impl WriteHandle {
    /// Opens a write handle on `file`, failing with
    /// [`FsError::HandleConflict`] if another one is already open.
    pub fn open_on(file: &File) -> Result<Self> {
        let mut handle = Self {
            state: CursorState::closed(file),
        };
        handle.open()?;
        Ok(handle)
    }

    /// Replaces the entire content; the cursor moves to the new end.
    pub fn write(&mut self, content: &str) {
        ensure_open(&self.state, "write with");
        self.state.file.0.borrow_mut().content = content.to_owned();
        self.state.cursor = content.chars().count();
    }

    /// Appends to the content; the cursor moves to the new end.
    pub fn concat(&mut self, content: &str) {
        ensure_open(&self.state, "write with");
        let len = {
            let mut data = self.state.file.0.borrow_mut();
            data.content.push_str(content);
            data.content.chars().count()
        };
        self.state.cursor = len;
    }

    /// Splices `content` in at the cursor and advances the cursor past it.
    pub fn insert(&mut self, content: &str) {
        ensure_open(&self.state, "write with");
        let at = {
            let mut data = self.state.file.0.borrow_mut();
            let len = data.content.chars().count();
            let at = self.state.cursor.min(len);
            let offset = byte_offset(&data.content, at);
            data.content.insert_str(offset, content);
            at
        };
        self.state.cursor = at + content.chars().count();
    }
}

impl Handle for WriteHandle {
    fn state(&self) -> &CursorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CursorState {
        &mut self.state
    }

    fn open(&mut self) -> Result<()> {
        if self.is_open() {
            self.state.cursor = 0;
            return Ok(());
        }
        let mut data = self.state.file.0.borrow_mut();
        if data.writer.is_some() {
            drop(data);
            return Err(FsError::HandleConflict(self.state.file.path()).into());
        }
        let id = data.next_handle_id();
        data.writer = Some(id);
        self.state.id = Some(id);
        self.state.cursor = 0;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(id) = self.state.id.take() {
            let mut data = self.state.file.0.borrow_mut();
            if data.writer == Some(id) {
                data.writer = None;
            }
        }
    }
}

impl Drop for WriteHandle {
    fn drop(&mut self) {
        self.close();
    }
}
