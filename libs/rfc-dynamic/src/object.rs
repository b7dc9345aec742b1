use std::fmt;
use std::marker::PhantomData;

use rfc_api::{DataHandle, RfcType};

use crate::context::RfcContext;
use crate::dispatch;
use crate::error::DynamicError;
use crate::once::OnceResolved;
use crate::value::{FromValue, Value, ValueKind};

/// Name and type tag of one field or parameter, as the descriptor reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    pub name: String,
    pub ty: RfcType,
}

/// How a container finds its own shape.
///
/// Structures describe their line type, function calls describe the function;
/// everything downstream of the descriptor is shared by [`DynamicObject`].
pub trait DescriptorStrategy {
    type Desc: Copy + fmt::Debug;

    /// Used in logs and `Debug` output.
    const NAME: &'static str;

    fn describe(ctx: RfcContext<'_>, handle: DataHandle) -> Result<Self::Desc, DynamicError>;

    fn count(ctx: RfcContext<'_>, desc: Self::Desc) -> Result<usize, DynamicError>;

    /// `Ok(None)` if the descriptor has no entry at `index`.
    fn field_by_index(
        ctx: RfcContext<'_>,
        desc: Self::Desc,
        index: usize,
    ) -> Result<Option<FieldKey>, DynamicError>;

    /// `Ok(None)` if the descriptor has no entry called `name`.
    fn field_by_name(ctx: RfcContext<'_>, desc: Self::Desc, name: &str) -> Result<Option<FieldKey>, DynamicError>;
}

/// Key- and position-addressable view over a structure or a function call.
///
/// The descriptor and the field count are resolved on first use and cached
/// for the life of the view. Field values are never cached: every `get`
/// reads the native container again.
///
/// Iteration ([`keys`](Self::keys), [`values`](Self::values),
/// [`iter`](Self::iter)) follows descriptor order and is restartable.
pub struct DynamicObject<'a, S: DescriptorStrategy> {
    ctx: RfcContext<'a>,
    handle: DataHandle,
    desc: OnceResolved<S::Desc>,
    count: OnceResolved<usize>,
    _strategy: PhantomData<S>,
}

impl<'a, S: DescriptorStrategy> DynamicObject<'a, S> {
    pub fn new(ctx: RfcContext<'a>, handle: DataHandle) -> Self {
        Self {
            ctx,
            handle,
            desc: OnceResolved::new(),
            count: OnceResolved::new(),
            _strategy: PhantomData,
        }
    }

    /// View whose descriptor is already known; `describe` is never called.
    pub fn with_descriptor(ctx: RfcContext<'a>, handle: DataHandle, desc: S::Desc) -> Self {
        Self {
            desc: OnceResolved::resolved(desc),
            ..Self::new(ctx, handle)
        }
    }

    #[inline]
    pub fn handle(&self) -> DataHandle {
        self.handle
    }

    #[inline]
    pub fn context(&self) -> RfcContext<'a> {
        self.ctx
    }

    pub fn descriptor(&self) -> Result<S::Desc, DynamicError> {
        self.desc.get_or_try_resolve(|| {
            let desc = S::describe(self.ctx, self.handle)?;
            tracing::trace!(kind = S::NAME, handle = ?self.handle, ?desc, "resolved descriptor");
            Ok(desc)
        })
    }

    /// Number of fields or parameters.
    pub fn count(&self) -> Result<usize, DynamicError> {
        self.count.get_or_try_resolve(|| {
            let count = S::count(self.ctx, self.descriptor()?)?;
            tracing::trace!(kind = S::NAME, handle = ?self.handle, count, "resolved field count");
            Ok(count)
        })
    }

    pub fn contains_key(&self, name: &str) -> Result<bool, DynamicError> {
        Ok(self.field(name)?.is_some())
    }

    /// Descriptor entry for `name`.
    pub fn field(&self, name: &str) -> Result<Option<FieldKey>, DynamicError> {
        S::field_by_name(self.ctx, self.descriptor()?, name)
    }

    /// Descriptor entry at `index`.
    pub fn field_at(&self, index: usize) -> Result<Option<FieldKey>, DynamicError> {
        S::field_by_index(self.ctx, self.descriptor()?, index)
    }

    /// Value of field `name`; `Ok(None)` if there is no such field.
    pub fn get(&self, name: &str) -> Result<Option<Value<'a>>, DynamicError> {
        self.get_with(name, ValueKind::Any)
    }

    /// Value of field `name` converted to `kind`.
    ///
    /// `Ok(None)` if there is no such field or the value does not convert.
    pub fn get_with(&self, name: &str, kind: ValueKind) -> Result<Option<Value<'a>>, DynamicError> {
        let Some(key) = self.field(name)? else {
            return Ok(None);
        };
        self.extract(&key, kind)
    }

    /// Typed read: `obj.get_as::<i64>("COUNT")`.
    pub fn get_as<T: FromValue<'a>>(&self, name: &str) -> Result<Option<T>, DynamicError> {
        Ok(self.get_with(name, T::KIND)?.and_then(T::from_value))
    }

    /// Name and value of the field at `index`; `Ok(None)` past the end.
    pub fn get_index(&self, index: usize) -> Result<Option<(String, Value<'a>)>, DynamicError> {
        self.get_index_with(index, ValueKind::Any)
    }

    pub fn get_index_with(
        &self,
        index: usize,
        kind: ValueKind,
    ) -> Result<Option<(String, Value<'a>)>, DynamicError> {
        let Some(key) = self.field_at(index)? else {
            return Ok(None);
        };
        Ok(self.extract(&key, kind)?.map(|value| (key.name, value)))
    }

    pub fn keys(&self) -> Keys<'_, 'a, S> {
        Keys { walk: Walk::new(self) }
    }

    pub fn values(&self) -> Values<'_, 'a, S> {
        Values { walk: Walk::new(self) }
    }

    pub fn iter(&self) -> Iter<'_, 'a, S> {
        Iter { walk: Walk::new(self) }
    }

    fn extract(&self, key: &FieldKey, kind: ValueKind) -> Result<Option<Value<'a>>, DynamicError> {
        dispatch::try_get_value(self.ctx, self.handle, &key.name, key.ty, kind)
            .map_err(|e| e.with_context(format!("{} field '{}'", S::NAME, key.name)))
    }

    fn read(&self, key: &FieldKey) -> Result<Value<'a>, DynamicError> {
        dispatch::get_value(self.ctx, self.handle, &key.name, key.ty)
            .map_err(|e| e.with_context(format!("{} field '{}'", S::NAME, key.name)))
    }
}

impl<S: DescriptorStrategy> Clone for DynamicObject<'_, S> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx,
            handle: self.handle,
            desc: self.desc.clone(),
            count: self.count.clone(),
            _strategy: PhantomData,
        }
    }
}

impl<S: DescriptorStrategy> fmt::Debug for DynamicObject<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(S::NAME)
            .field("handle", &self.handle)
            .field("desc", &self.desc)
            .field("count", &self.count)
            .finish()
    }
}

impl<'o, 'a, S: DescriptorStrategy> IntoIterator for &'o DynamicObject<'a, S> {
    type Item = Result<(String, Value<'a>), DynamicError>;
    type IntoIter = Iter<'o, 'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Iteration
// ---------------------------------------------------------------------------

/// Position walk over `0..count()`, shared by the three iterators.
///
/// Fuses after the first error.
struct Walk<'o, 'a, S: DescriptorStrategy> {
    object: &'o DynamicObject<'a, S>,
    next: usize,
    done: bool,
}

impl<'o, 'a, S: DescriptorStrategy> Walk<'o, 'a, S> {
    fn new(object: &'o DynamicObject<'a, S>) -> Self {
        Self {
            object,
            next: 0,
            done: false,
        }
    }

    fn next_key(&mut self) -> Option<Result<FieldKey, DynamicError>> {
        if self.done {
            return None;
        }
        let result = self.step();
        if !matches!(result, Some(Ok(_))) {
            self.done = true;
        }
        result
    }

    fn step(&mut self) -> Option<Result<FieldKey, DynamicError>> {
        let count = match self.object.count() {
            Ok(count) => count,
            Err(e) => return Some(Err(e)),
        };
        if self.next >= count {
            return None;
        }
        let index = self.next;
        self.next += 1;

        // The descriptor promised `count` entries; a hole is not a soft miss.
        match self.object.field_at(index) {
            Ok(Some(key)) => Some(Ok(key)),
            Ok(None) => Some(Err(DynamicError::MissingField { index, count })),
            Err(e) => Some(Err(e)),
        }
    }

    fn remaining(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        match self.object.count.get() {
            Some(count) => {
                let left = count.saturating_sub(self.next);
                (left, Some(left))
            }
            None => (0, None),
        }
    }

    fn read(&mut self, key: FieldKey) -> Result<Value<'a>, DynamicError> {
        let value = self.object.read(&key);
        if value.is_err() {
            self.done = true;
        }
        value
    }
}

/// Field names in descriptor order.
pub struct Keys<'o, 'a, S: DescriptorStrategy> {
    walk: Walk<'o, 'a, S>,
}

impl<S: DescriptorStrategy> Iterator for Keys<'_, '_, S> {
    type Item = Result<String, DynamicError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next_key().map(|key| key.map(|key| key.name))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walk.remaining()
    }
}

/// Field values in descriptor order, each read fresh.
pub struct Values<'o, 'a, S: DescriptorStrategy> {
    walk: Walk<'o, 'a, S>,
}

impl<'a, S: DescriptorStrategy> Iterator for Values<'_, 'a, S> {
    type Item = Result<Value<'a>, DynamicError>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = match self.walk.next_key()? {
            Ok(key) => key,
            Err(e) => return Some(Err(e)),
        };
        Some(self.walk.read(key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walk.remaining()
    }
}

/// `(name, value)` pairs in descriptor order.
pub struct Iter<'o, 'a, S: DescriptorStrategy> {
    walk: Walk<'o, 'a, S>,
}

impl<'a, S: DescriptorStrategy> Iterator for Iter<'_, 'a, S> {
    type Item = Result<(String, Value<'a>), DynamicError>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = match self.walk.next_key()? {
            Ok(key) => key,
            Err(e) => return Some(Err(e)),
        };
        let name = key.name.clone();
        Some(self.walk.read(key).map(|value| (name, value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walk.remaining()
    }
}
