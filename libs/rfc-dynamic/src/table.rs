use rfc_api::{RfcResultCode, TableHandle};

use crate::context::RfcContext;
use crate::error::{DynamicError, NativeResultExt};
use crate::once::OnceResolved;
use crate::structure::StructureView;

/// Position-indexed view over a native table.
///
/// Every row is a [`StructureView`] over the row handle the native layer
/// returns for the current cursor position.
///
/// # Shared cursor
///
/// The native table has exactly one row cursor, and both access patterns
/// move it. [`get`](Self::get) repositions it, and so does every step of a
/// [`rows`](Self::rows) iteration. Indexed access is last-writer on the
/// cursor: calling `get` while a `Rows` iterator is alive changes which row
/// the iterator advances from. A fresh `rows()` always starts over with a
/// move to the first row. Use a table either by index or by iteration within
/// one logical pass, not both.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    ctx: RfcContext<'a>,
    handle: TableHandle,
    row_count: OnceResolved<usize>,
}

impl<'a> TableView<'a> {
    pub fn new(ctx: RfcContext<'a>, handle: TableHandle) -> Self {
        Self {
            ctx,
            handle,
            row_count: OnceResolved::new(),
        }
    }

    #[inline]
    pub fn handle(&self) -> TableHandle {
        self.handle
    }

    /// Number of rows.
    pub fn count(&self) -> Result<usize, DynamicError> {
        self.row_count.get_or_try_resolve(|| {
            let count = self.ctx.interop().get_row_count(self.handle).fatal("RfcGetRowCount")?;
            tracing::trace!(table = ?self.handle, count, "resolved row count");
            Ok(count as usize)
        })
    }

    pub fn is_empty(&self) -> Result<bool, DynamicError> {
        Ok(self.count()? == 0)
    }

    /// Row at `index`.
    ///
    /// Moves the shared cursor. Rows are dense in `0..count()`, so an index
    /// the native layer rejects is an error, not a miss.
    pub fn get(&self, index: usize) -> Result<StructureView<'a>, DynamicError> {
        let position = u32::try_from(index).map_err(|_| DynamicError::RowIndex(index))?;
        let interop = self.ctx.interop();

        tracing::debug!(table = ?self.handle, index, "moving cursor");
        interop
            .move_to(self.handle, position)
            .fatal("RfcMoveTo")
            .map_err(|e| e.with_context(format!("row {index}")))?;
        let row = interop.get_current_row(self.handle).fatal("RfcGetCurrentRow")?;
        Ok(StructureView::new(self.ctx, row))
    }

    /// Forward iteration from the first row, on the shared cursor.
    pub fn rows(&self) -> Rows<'a> {
        Rows {
            ctx: self.ctx,
            handle: self.handle,
            state: CursorState::BeforeFirst,
        }
    }

    pub fn iter(&self) -> Rows<'a> {
        self.rows()
    }
}

impl<'a> IntoIterator for &TableView<'a> {
    type Item = Result<StructureView<'a>, DynamicError>;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Rows<'a> {
        self.rows()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    BeforeFirst,
    OnRow(usize),
    AfterLast,
}

/// Sequential traversal of a table.
///
/// Each step moves the table's one native cursor (see [`TableView`]).
/// Running off the end (`TableMoveEof` on a move to the next row), or
/// starting on an empty table (`TableMoveBof` on a move to the first row),
/// ends the iteration; any other native failure is yielded once and ends it
/// too.
#[derive(Debug)]
pub struct Rows<'a> {
    ctx: RfcContext<'a>,
    handle: TableHandle,
    state: CursorState,
}

impl<'a> Rows<'a> {
    fn advance(&mut self) -> Result<Option<usize>, DynamicError> {
        let interop = self.ctx.interop();
        // BOF ends a move to the first row (empty table), EOF a move to the next.
        let (moved, call, end, next) = match self.state {
            CursorState::BeforeFirst => (
                interop.move_to_first_row(self.handle),
                "RfcMoveToFirstRow",
                RfcResultCode::TableMoveBof,
                0,
            ),
            CursorState::OnRow(i) => (
                interop.move_to_next_row(self.handle),
                "RfcMoveToNextRow",
                RfcResultCode::TableMoveEof,
                i + 1,
            ),
            CursorState::AfterLast => return Ok(None),
        };

        match moved {
            Ok(()) => Ok(Some(next)),
            Err(info) if info.code == end => {
                tracing::debug!(table = ?self.handle, rows = next, "end of table");
                Ok(None)
            }
            Err(info) => Err(DynamicError::native(call, info)),
        }
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Result<StructureView<'a>, DynamicError>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.advance().and_then(|position| match position {
            Some(index) => {
                let row = self.ctx.interop().get_current_row(self.handle).fatal("RfcGetCurrentRow")?;
                Ok(Some((index, row)))
            }
            None => Ok(None),
        });

        match step {
            Ok(Some((index, row))) => {
                self.state = CursorState::OnRow(index);
                Some(Ok(StructureView::new(self.ctx, row)))
            }
            Ok(None) => {
                self.state = CursorState::AfterLast;
                None
            }
            Err(e) => {
                self.state = CursorState::AfterLast;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Rows<'_> {}
