//! Wire codec.
//!
//! Fixed-size values are the plain concatenation of their parts. A
//! variable-size List or Vector is a table of 4-byte little-endian offsets,
//! one per element, followed by the element payloads. A variable-size
//! Container writes its fixed fields inline and a 4-byte offset in place of
//! each variable field, payloads following in field order. Every offset
//! counts from the start of the enclosing value.
//!
//! Decoding validates every offset and size before building any tree, so a
//! malformed input never yields a partial value.

use crate::error::{Error, Result};
use crate::iter::{ElementIter, NodeWalker};
use crate::tree::{fill_to_contents, Node};
use crate::types::{TypeKind, TypeRef, BYTES_PER_CHUNK, OFFSET_BYTE_LENGTH};
use crate::view::list::length_leaf;
use crate::view::{pack_bytes, Aggregate, BasicView, ContainerView, ListView, VectorView, View};
use std::io::{self, Read, Write};

impl View {
    /// Write the encoding of this value to `sink`, returning the number of
    /// bytes written.
    pub fn serialize<W: Write + ?Sized>(&self, sink: &mut W) -> Result<usize> {
        match self {
            View::Basic(basic) => {
                let bytes = basic.to_bytes();
                sink.write_all(&bytes)?;
                Ok(bytes.len())
            }
            View::List(list) => write_sequence(
                list.elem_type(),
                list.contents(),
                list.type_def().depth(),
                list.len(),
                sink,
            ),
            View::Vector(vector) => write_sequence(
                vector.elem_type(),
                vector.backing().clone(),
                vector.type_def().depth(),
                vector.len(),
                sink,
            ),
            View::Container(container) => write_container(container, sink),
        }
    }

    /// Read a value of type `ty` spanning exactly `scope` bytes of `source`.
    pub fn deserialize<R: Read + ?Sized>(ty: &TypeRef, source: &mut R, scope: usize) -> Result<View> {
        check_scope(ty, scope)?;
        let mut bytes = Vec::new();
        Read::take(&mut *source, scope as u64).read_to_end(&mut bytes)?;
        if bytes.len() != scope {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("source ended after {} of {} bytes", bytes.len(), scope),
            )
            .into());
        }
        decode_value(ty, &bytes)
    }

    /// Encoding as an owned byte vector.
    pub fn encode_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.value_byte_length()?);
        self.serialize(&mut out)?;
        Ok(out)
    }

    /// Decode a whole byte slice as a value of type `ty`.
    pub fn decode_bytes(ty: &TypeRef, bytes: &[u8]) -> Result<View> {
        decode_value(ty, bytes)
    }

    /// Length of this value's encoding, computed without encoding it.
    pub fn value_byte_length(&self) -> Result<usize> {
        if self.is_fixed_size() {
            return self.type_def().fixed_byte_length();
        }
        match self {
            View::List(list) => sequence_length(list.elem_type(), list.iter(), list.len()),
            View::Vector(vector) => sequence_length(vector.elem_type(), vector.iter(), vector.len()),
            View::Container(container) => {
                let mut total = 0usize;
                for field in container.fields() {
                    let (_, value) = field?;
                    total += value.value_byte_length()?;
                    if !value.is_fixed_size() {
                        total += OFFSET_BYTE_LENGTH;
                    }
                }
                Ok(total)
            }
            View::Basic(basic) => Ok(basic.kind().byte_length()),
        }
    }
}

fn sequence_length<I>(elem: &TypeRef, items: I, count: u64) -> Result<usize>
where
    I: Iterator<Item = Result<View>>,
{
    if elem.is_fixed_size() {
        return Ok(elem.fixed_byte_length()? * count as usize);
    }
    let mut total = 0usize;
    for item in items {
        total += OFFSET_BYTE_LENGTH + item?.value_byte_length()?;
    }
    Ok(total)
}

fn write_sequence<W: Write + ?Sized>(
    elem: &TypeRef,
    contents: Node,
    depth: u32,
    count: u64,
    sink: &mut W,
) -> Result<usize> {
    if let Some(kind) = elem.basic_kind() {
        let mut left = count as usize * kind.byte_length();
        let total = left;
        let chunk_count = count.div_ceil(kind.elems_per_chunk() as u64);
        for chunk in NodeWalker::new(contents, depth, chunk_count) {
            let take = left.min(BYTES_PER_CHUNK);
            sink.write_all(&chunk?.root()[..take])?;
            left -= take;
        }
        return Ok(total);
    }

    let items = ElementIter::new(elem, contents, depth, count).collect::<Result<Vec<View>>>()?;
    if elem.is_fixed_size() {
        let mut written = 0;
        for item in &items {
            written += item.serialize(sink)?;
        }
        return Ok(written);
    }

    let mut offset = items.len() * OFFSET_BYTE_LENGTH;
    for item in &items {
        write_offset(offset, sink)?;
        offset += item.value_byte_length()?;
    }
    let mut written = items.len() * OFFSET_BYTE_LENGTH;
    for item in &items {
        written += item.serialize(sink)?;
    }
    Ok(written)
}

fn write_container<W: Write + ?Sized>(container: &ContainerView, sink: &mut W) -> Result<usize> {
    let fields = container.fields().map(|f| f.map(|(_, v)| v)).collect::<Result<Vec<View>>>()?;

    let mut offset = 0usize;
    for value in &fields {
        offset += match value.is_fixed_size() {
            true => value.value_byte_length()?,
            false => OFFSET_BYTE_LENGTH,
        };
    }

    let mut written = 0usize;
    let mut variable = Vec::new();
    for value in &fields {
        if value.is_fixed_size() {
            written += value.serialize(sink)?;
        } else {
            written += write_offset(offset, sink)?;
            offset += value.value_byte_length()?;
            variable.push(value);
        }
    }
    for value in variable {
        written += value.serialize(sink)?;
    }
    Ok(written)
}

fn write_offset<W: Write + ?Sized>(offset: usize, sink: &mut W) -> Result<usize> {
    let offset = u32::try_from(offset).map_err(|_| {
        Error::Capacity(format!("offset {} does not fit in {} bytes", offset, OFFSET_BYTE_LENGTH))
    })?;
    sink.write_all(&offset.to_le_bytes())?;
    Ok(OFFSET_BYTE_LENGTH)
}

fn check_scope(ty: &TypeRef, scope: usize) -> Result<()> {
    if scope < ty.min_byte_length() || scope > ty.max_byte_length() {
        return Err(Error::decode(format!(
            "{} bytes is outside [{}, {}] for {}",
            scope,
            ty.min_byte_length(),
            ty.max_byte_length(),
            ty
        )));
    }
    Ok(())
}

fn decode_value(ty: &TypeRef, bytes: &[u8]) -> Result<View> {
    check_scope(ty, bytes.len())?;
    match ty.kind() {
        TypeKind::Basic(_) => Ok(View::Basic(BasicView::new(ty, bytes)?)),
        TypeKind::List { elem, limit } => {
            let nodes = decode_elements(elem, bytes, *limit, false)?;
            let length = element_count(elem, bytes, nodes.len());
            let contents = fill_to_contents(nodes, ty.depth())?;
            let backing = Node::pair(contents, length_leaf(length));
            Ok(View::List(ListView::from_backing(ty, backing)?))
        }
        TypeKind::Vector { elem, length } => {
            let nodes = decode_elements(elem, bytes, *length, true)?;
            let contents = fill_to_contents(nodes, ty.depth())?;
            Ok(View::Vector(VectorView::from_backing(ty, contents)?))
        }
        TypeKind::Container(def) => {
            let spans = container_spans(ty, bytes)?;
            let mut nodes = Vec::with_capacity(def.len());
            for (field, (start, end)) in def.fields().iter().zip(spans) {
                nodes.push(decode_value(&field.ty, &bytes[start..end])?.backing().clone());
            }
            let backing = fill_to_contents(nodes, ty.depth())?;
            Ok(View::Container(ContainerView::from_backing(ty, backing)?))
        }
    }
}

/// Logical element count of a decoded List: packed elements are counted in
/// bytes, everything else one node each.
fn element_count(elem: &TypeRef, bytes: &[u8], nodes: usize) -> u64 {
    match elem.basic_kind() {
        Some(kind) => (bytes.len() / kind.byte_length()) as u64,
        None => nodes as u64,
    }
}

/// Decode the element nodes of a List (`exact == false`, `bound` is the
/// limit) or a Vector (`exact == true`, `bound` is the length).
fn decode_elements(elem: &TypeRef, bytes: &[u8], bound: u64, exact: bool) -> Result<Vec<Node>> {
    let count_ok = |count: u64| if exact { count == bound } else { count <= bound };

    if let Some(kind) = elem.basic_kind() {
        let size = kind.byte_length();
        if bytes.len() % size != 0 {
            return Err(Error::decode(format!(
                "{} bytes is not a whole number of {} elements",
                bytes.len(),
                kind
            )));
        }
        let count = (bytes.len() / size) as u64;
        if !count_ok(count) {
            return Err(Error::decode(format!("{} elements, bound is {}", count, bound)));
        }
        if kind == crate::types::BasicKind::Boolean {
            if let Some(bad) = bytes.iter().find(|b| **b > 1) {
                return Err(Error::decode(format!("invalid boolean byte {:#04x}", bad)));
            }
        }
        return Ok(pack_bytes(bytes));
    }

    if let Ok(size) = elem.fixed_byte_length() {
        if bytes.len() % size != 0 {
            return Err(Error::decode(format!(
                "{} bytes is not a whole number of {}-byte {} elements",
                bytes.len(),
                size,
                elem
            )));
        }
        let count = (bytes.len() / size) as u64;
        if !count_ok(count) {
            return Err(Error::decode(format!("{} elements, bound is {}", count, bound)));
        }
        return bytes
            .chunks(size)
            .map(|piece| Ok(decode_value(elem, piece)?.backing().clone()))
            .collect();
    }

    if bytes.is_empty() {
        if !count_ok(0) {
            return Err(Error::decode(format!("no elements, expected {}", bound)));
        }
        return Ok(Vec::new());
    }
    let first = read_offset(bytes, 0)?;
    if first > bytes.len() {
        return Err(Error::decode(format!(
            "first offset {} is past the end of {} bytes",
            first,
            bytes.len()
        )));
    }
    if first % OFFSET_BYTE_LENGTH != 0 || first == 0 {
        return Err(Error::decode(format!(
            "first offset {} is not a positive multiple of {}",
            first, OFFSET_BYTE_LENGTH
        )));
    }
    let count = first / OFFSET_BYTE_LENGTH;
    if !count_ok(count as u64) {
        return Err(Error::decode(format!("{} elements, bound is {}", count, bound)));
    }

    let mut offsets = Vec::with_capacity(count + 1);
    for i in 0..count {
        offsets.push(read_offset(bytes, i * OFFSET_BYTE_LENGTH)?);
    }
    offsets.push(bytes.len());

    let mut nodes = Vec::with_capacity(count);
    for pair in offsets.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        check_span(elem, start, end, bytes.len())?;
        nodes.push(decode_value(elem, &bytes[start..end])?.backing().clone());
    }
    Ok(nodes)
}

/// Byte span of every Container field, validated against the prologue.
fn container_spans(ty: &TypeRef, bytes: &[u8]) -> Result<Vec<(usize, usize)>> {
    let def = ty.as_container().ok_or_else(|| Error::TypeMismatch {
        expected: "a Container type".to_string(),
        got: ty.to_string(),
    })?;

    let prologue: usize = def
        .fields()
        .iter()
        .map(|f| f.ty.fixed_byte_length().unwrap_or(OFFSET_BYTE_LENGTH))
        .sum();
    if bytes.len() < prologue {
        return Err(Error::decode(format!(
            "{} bytes is shorter than the {}-byte prologue of {}",
            bytes.len(),
            prologue,
            ty
        )));
    }

    // (field index, start) for fixed fields, (field index, offset) for variable ones.
    let mut spans = vec![(0usize, 0usize); def.len()];
    let mut variable = Vec::new();
    let mut cursor = 0usize;
    for (i, field) in def.fields().iter().enumerate() {
        match field.ty.fixed_byte_length() {
            Ok(size) => {
                spans[i] = (cursor, cursor + size);
                cursor += size;
            }
            Err(_) => {
                variable.push((i, read_offset(bytes, cursor)?));
                cursor += OFFSET_BYTE_LENGTH;
            }
        }
    }

    match variable.first() {
        None if bytes.len() != prologue => {
            return Err(Error::decode(format!(
                "{} trailing bytes after fixed-size {}",
                bytes.len() - prologue,
                ty
            )))
        }
        Some((_, first)) if *first != prologue => {
            return Err(Error::decode(format!(
                "first offset {} does not match the {}-byte prologue",
                first, prologue
            )))
        }
        _ => {}
    }

    for (n, (field_index, start)) in variable.iter().enumerate() {
        let end = variable.get(n + 1).map_or(bytes.len(), |(_, next)| *next);
        check_span(&def.fields()[*field_index].ty, *start, end, bytes.len())?;
        spans[*field_index] = (*start, end);
    }
    Ok(spans)
}

fn check_span(ty: &TypeRef, start: usize, end: usize, scope: usize) -> Result<()> {
    if start > end || end > scope {
        return Err(Error::decode(format!(
            "offsets {}..{} are decreasing or past {} bytes",
            start, end, scope
        )));
    }
    let size = end - start;
    if size < ty.min_byte_length() || size > ty.max_byte_length() {
        return Err(Error::decode(format!(
            "{} bytes for {} is outside [{}, {}]",
            size,
            ty,
            ty.min_byte_length(),
            ty.max_byte_length()
        )));
    }
    Ok(())
}

fn read_offset(bytes: &[u8], at: usize) -> Result<usize> {
    let raw = bytes
        .get(at..at + OFFSET_BYTE_LENGTH)
        .ok_or_else(|| Error::decode(format!("offset at {} runs past {} bytes", at, bytes.len())))?;
    let mut word = [0u8; OFFSET_BYTE_LENGTH];
    word.copy_from_slice(raw);
    Ok(u32::from_le_bytes(word) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDef;
    use hex_literal::hex;
    use proptest::prelude::*;

    fn sample_container() -> TypeRef {
        TypeDef::container(
            "Sample",
            [("a", TypeDef::uint8()), ("b", TypeDef::byte_list(16).unwrap())],
        )
        .unwrap()
    }

    #[test]
    fn test_byte_vector_scenario() {
        let ty = TypeDef::byte_vector(4).unwrap();
        let view = View::from(VectorView::new(&ty, [1u8, 2, 3, 4]).unwrap());
        let bytes = view.encode_bytes().unwrap();
        assert_eq!(bytes, hex!("01020304"));
        assert_eq!(View::decode_bytes(&ty, &bytes).unwrap(), view);
    }

    #[test]
    fn test_empty_list_scenario() {
        let ty = TypeDef::byte_list(8).unwrap();
        let view = View::from(ListView::new(&ty, Vec::<u8>::new()).unwrap());
        assert!(view.encode_bytes().unwrap().is_empty());
        assert_eq!(view.hash_tree_root(), View::default_of(&ty).hash_tree_root());

        let decoded = View::decode_bytes(&ty, &[]).unwrap();
        assert_eq!(decoded, view);
    }

    #[test]
    fn test_container_scenario() {
        let ty = sample_container();
        let view = View::from(
            ContainerView::builder(&ty)
                .unwrap()
                .field("a", 7u8)
                .unwrap()
                .field("b", vec![1u8, 2])
                .unwrap()
                .build()
                .unwrap(),
        );
        let bytes = view.encode_bytes().unwrap();
        assert_eq!(bytes, hex!("07 05000000 0102"));
        assert_eq!(view.value_byte_length().unwrap(), 7);

        let decoded = View::decode_bytes(&ty, &bytes).unwrap();
        assert_eq!(decoded, view);
        assert_eq!(decoded.hash_tree_root(), view.hash_tree_root());
    }

    #[test]
    fn test_serialize_reports_bytes_written() {
        let ty = TypeDef::list(TypeDef::uint32(), 16).unwrap();
        let view = View::from(ListView::new(&ty, [1u32, 2, 3]).unwrap());
        let mut sink = Vec::new();
        assert_eq!(view.serialize(&mut sink).unwrap(), 12);
        assert_eq!(sink, hex!("010000000200000003000000"));
    }

    #[test]
    fn test_deserialize_reads_scope_only() {
        let ty = TypeDef::uint16();
        let mut source: &[u8] = &hex!("3412 ffff");
        let view = View::deserialize(&ty, &mut source, 2).unwrap();
        assert_eq!(view.to_u64().unwrap(), 0x1234);
        assert_eq!(source, &hex!("ffff"));
    }

    #[test]
    fn test_deserialize_checks_scope_first() {
        let ty = TypeDef::byte_list(4).unwrap();
        let mut source: &[u8] = &[0u8; 10];
        assert!(matches!(View::deserialize(&ty, &mut source, 5), Err(Error::Decode(_))));
        let mut short: &[u8] = &[0u8; 2];
        assert!(matches!(View::deserialize(&ty, &mut short, 3), Err(Error::Io(_))));
    }

    #[test]
    fn test_deserialize_short_source_with_huge_scope() {
        let ty = TypeDef::list(TypeDef::byte_list(1 << 20).unwrap(), 1 << 20).unwrap();
        let scope = ty.max_byte_length();
        let mut short: &[u8] = &hex!("04000000 aa");
        assert!(matches!(View::deserialize(&ty, &mut short, scope), Err(Error::Io(_))));
    }

    #[test]
    fn test_variable_elements_offsets() {
        let elem = TypeDef::byte_list(4).unwrap();
        let ty = TypeDef::list(elem.clone(), 4).unwrap();
        let view = View::from(ListView::new(&ty, [vec![0xAAu8], vec![], vec![0xBB, 0xCC]]).unwrap());
        let bytes = view.encode_bytes().unwrap();
        assert_eq!(bytes, hex!("0c000000 0d000000 0d000000 aa bbcc"));
        assert_eq!(View::decode_bytes(&ty, &bytes).unwrap(), view);
    }

    #[test]
    fn test_rejects_decreasing_offsets() {
        let ty = TypeDef::list(TypeDef::byte_list(4).unwrap(), 4).unwrap();
        let bytes = hex!("08000000 07000000 aabb");
        assert!(matches!(View::decode_bytes(&ty, &bytes), Err(Error::Decode(_))));
    }

    #[test]
    fn test_rejects_oversized_element() {
        let ty = TypeDef::list(TypeDef::byte_list(2).unwrap(), 4).unwrap();
        let bytes = hex!("04000000 aabbcc");
        assert!(matches!(View::decode_bytes(&ty, &bytes), Err(Error::Decode(_))));
    }

    #[test]
    fn test_rejects_bad_first_offset() {
        let ty = TypeDef::list(TypeDef::byte_list(8).unwrap(), 4).unwrap();
        // Not a multiple of 4.
        assert!(View::decode_bytes(&ty, &hex!("05000000 aa")).is_err());
        // Past the end.
        assert!(View::decode_bytes(&ty, &hex!("40000000 aa")).is_err());
        // More elements than the limit.
        let bytes = hex!("14000000 14000000 14000000 14000000 14000000");
        assert!(View::decode_bytes(&ty, &bytes).is_err());
    }

    #[test]
    fn test_rejects_container_prologue_mismatch() {
        let ty = sample_container();
        assert!(View::decode_bytes(&ty, &hex!("07 06000000 0102")).is_err());
        assert!(View::decode_bytes(&ty, &hex!("07 05000000")).is_ok());
        assert!(View::decode_bytes(&ty, &hex!("07 0500")).is_err());
    }

    #[test]
    fn test_rejects_invalid_booleans() {
        let ty = TypeDef::list(TypeDef::boolean(), 8).unwrap();
        assert!(View::decode_bytes(&ty, &hex!("0100")).is_ok());
        assert!(matches!(View::decode_bytes(&ty, &hex!("0102")), Err(Error::Decode(_))));
    }

    #[test]
    fn test_rejects_wrong_vector_length() {
        let ty = TypeDef::vector(TypeDef::uint16(), 3).unwrap();
        assert!(View::decode_bytes(&ty, &hex!("01000200")).is_err());
        assert!(View::decode_bytes(&ty, &hex!("010002000300")).is_ok());
    }

    #[test]
    fn test_variable_size_vector() {
        let ty = TypeDef::vector(TypeDef::byte_list(4).unwrap(), 3).unwrap();
        let view = View::from(VectorView::new(&ty, [vec![1u8], vec![], vec![2, 3]]).unwrap());
        assert!(!view.is_fixed_size());
        let bytes = view.encode_bytes().unwrap();
        assert_eq!(bytes, hex!("0c000000 0d000000 0d000000 01 0203"));
        assert_eq!(view.value_byte_length().unwrap(), bytes.len());
        assert_eq!(View::decode_bytes(&ty, &bytes).unwrap(), view);

        // Two offsets for three elements.
        assert!(matches!(
            View::decode_bytes(&ty, &hex!("08000000 09000000 01 02")),
            Err(Error::Decode(_))
        ));
        // Four offsets for three elements.
        assert!(matches!(
            View::decode_bytes(&ty, &hex!("10000000 10000000 10000000 10000000")),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_container_with_two_variable_fields() {
        let ty = TypeDef::container(
            "Pair",
            [
                ("a", TypeDef::uint8()),
                ("b", TypeDef::byte_list(4).unwrap()),
                ("c", TypeDef::byte_list(4).unwrap()),
            ],
        )
        .unwrap();
        let good = hex!("07 09000000 0a000000 aa bb");
        let view = View::decode_bytes(&ty, &good).unwrap();
        let container = view.as_container().unwrap();
        assert_eq!(container.get("b").unwrap().encode_bytes().unwrap(), vec![0xaa]);
        assert_eq!(container.get("c").unwrap().encode_bytes().unwrap(), vec![0xbb]);
        assert_eq!(view.encode_bytes().unwrap(), good);

        // Second offset before the first.
        assert!(matches!(
            View::decode_bytes(&ty, &hex!("07 09000000 08000000 aa bb")),
            Err(Error::Decode(_))
        ));
        // Second offset past the end.
        assert!(matches!(
            View::decode_bytes(&ty, &hex!("07 09000000 10000000 aa bb")),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_packed_count_size() {
        let ty = TypeDef::list(TypeDef::uint64(), 100).unwrap();
        let view = View::from(ListView::new(&ty, 0u64..37).unwrap());
        assert_eq!(view.encode_bytes().unwrap().len(), 37 * 8);
        assert_eq!(view.value_byte_length().unwrap(), 37 * 8);
    }

    #[test]
    fn test_nested_fixed_containers() {
        let point = TypeDef::container("Point", [("x", TypeDef::uint32()), ("y", TypeDef::uint32())]).unwrap();
        let ty = TypeDef::list(point.clone(), 4).unwrap();
        let a = ContainerView::builder(&point)
            .unwrap()
            .field("x", 1u32)
            .unwrap()
            .field("y", 2u32)
            .unwrap()
            .build()
            .unwrap();
        let view = View::from(ListView::new(&ty, [a.clone(), a]).unwrap());
        let bytes = view.encode_bytes().unwrap();
        assert_eq!(bytes, hex!("0100000002000000 0100000002000000"));
        assert_eq!(View::decode_bytes(&ty, &bytes).unwrap(), view);
    }

    proptest! {
        #[test]
        fn prop_roundtrip_nested(
            items in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..8), 0..6),
            flag in any::<bool>(),
            word in any::<u64>(),
        ) {
            let inner = TypeDef::byte_list(8).unwrap();
            let ty = TypeDef::container(
                "Nested",
                [
                    ("flag", TypeDef::boolean()),
                    ("items", TypeDef::list(inner, 6).unwrap()),
                    ("word", TypeDef::uint64()),
                ],
            )
            .unwrap();
            let items_ty = ty.as_container().unwrap().fields()[1].ty.clone();
            let view = View::from(
                ContainerView::builder(&ty)
                    .unwrap()
                    .field("flag", flag)
                    .unwrap()
                    .field("items", ListView::new(&items_ty, items.clone()).unwrap())
                    .unwrap()
                    .field("word", word)
                    .unwrap()
                    .build()
                    .unwrap(),
            );
            let bytes = view.encode_bytes().unwrap();
            prop_assert_eq!(bytes.len(), view.value_byte_length().unwrap());
            let decoded = View::decode_bytes(&ty, &bytes).unwrap();
            prop_assert_eq!(decoded.hash_tree_root(), view.hash_tree_root());
            prop_assert_eq!(decoded, view);
        }

        #[test]
        fn prop_packed_encoding_length(values in proptest::collection::vec(any::<u32>(), 0..50)) {
            let ty = TypeDef::list(TypeDef::uint32(), 64).unwrap();
            let view = View::from(ListView::new(&ty, values.clone()).unwrap());
            let bytes = view.encode_bytes().unwrap();
            prop_assert_eq!(bytes.len(), values.len() * 4);
            prop_assert_eq!(View::decode_bytes(&ty, &bytes).unwrap(), view);
        }
    }
}
