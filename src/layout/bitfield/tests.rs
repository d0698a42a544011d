use crate::layout::{BitFieldArrayItem, BitFieldArrayValue, BitFieldValue, LayoutError, StructBuilder, Value, pack};

fn ints(values: &[i128]) -> Vec<BitFieldArrayItem> {
	values.iter().map(|value| BitFieldArrayItem::int(*value).expect("in range")).collect()
}

fn sample() -> BitFieldArrayValue {
	let mut array = BitFieldArrayValue::new("entries", &["id", "flags"]).expect("array");
	array
		.extend([ints(&[5, 1]), ints(&[2, 0]), ints(&[12, 3])])
		.expect("entries");
	array
}

#[test]
fn bit_field_packs_fields_lsb_first() {
	let mut value = BitFieldValue::new("bitField8", 8).expect("bitfield");
	value
		.add("aFlag", 1, 1)
		.expect("aFlag")
		.add("bFlag", 0, 1)
		.expect("bFlag")
		.add("cFlag", 1, 1)
		.expect("cFlag")
		.add("values", 3, 2)
		.expect("values");
	// bits 1,0,1,1,1,0,0,0
	assert_eq!(value.packed_value(), 0b0001_1101);
	assert_eq!(value.to_le_bytes(), vec![0x1D]);
	assert_eq!(value.get("values"), Some(3));
}

#[test]
fn wide_bit_field_is_little_endian() {
	let mut value = BitFieldValue::new("time", 16).expect("bitfield");
	value.add("low", 0xFF, 8).expect("low").add("high", 0x12, 8).expect("high");
	assert_eq!(value.to_le_bytes(), vec![0xFF, 0x12]);
}

#[test]
fn bit_field_values_must_fit_their_width() {
	let mut value = BitFieldValue::new("small", 8).expect("bitfield");
	let err = value.add("x", 4, 2).expect_err("4 needs 3 bits");
	assert!(matches!(err, LayoutError::ValueOutOfRange { value: 4, .. }));

	value.add("y", 0, 5).expect("y");
	let err = value.add("z", 0, 4).expect_err("container full");
	assert!(matches!(err, LayoutError::BitFieldOverflow { used: 5, requested: 4, .. }));
	assert_eq!(value.values(), &[0]);
}

#[test]
fn array_header_lists_entry_width_and_field_offsets() {
	let array = sample();
	assert_eq!(array.field_widths(), vec![4, 2]);
	assert_eq!(array.header().expect("header"), vec![6, 64, 68, 70]);
}

#[test]
fn field_widths_can_be_recovered_from_header() {
	let array = sample();
	let header = array.header().expect("header");
	let recovered: Vec<u32> = header[1..].windows(2).map(|pair| u32::from(pair[1] - pair[0])).collect();
	assert_eq!(recovered, array.field_widths());
	assert_eq!(u32::from(header[0]), recovered.iter().sum::<u32>());
}

#[test]
fn array_encodes_header_then_packed_entries() {
	let array = sample();
	let bytes = array.encode().expect("encode");
	assert_eq!(bytes, vec![0x06, 0x00, 0x40, 0x00, 0x44, 0x00, 0x46, 0x00, 0x95, 0xC0, 0x03]);
	assert_eq!(bytes.len(), array.immediate_size());
}

#[test]
fn data_length_rounds_entry_bits_up_to_bytes() {
	let array = sample();
	let header_bytes = (array.ty().fields.len() + 2) * 2;
	let total_bits = 6 * array.len();
	assert_eq!(array.immediate_size() - header_bytes, total_bits.div_ceil(8));
}

#[test]
fn blob_items_are_zero_padded_to_field_width() {
	let mut array = BitFieldArrayValue::new("tagged", &["tag", "blob"]).expect("array");
	array
		.add_entry(vec![BitFieldArrayItem::Int(1), BitFieldArrayItem::Bits(vec![true, false, true])])
		.expect("first")
		.add_entry(vec![BitFieldArrayItem::Int(0), BitFieldArrayItem::Bits(vec![true])])
		.expect("second");
	assert_eq!(array.header().expect("header"), vec![4, 64, 65, 68]);
	assert_eq!(array.encode().expect("encode")[8..], [0x2B]);
}

#[test]
fn empty_array_is_header_only() {
	let array = BitFieldArrayValue::new("none", &["a", "b"]).expect("array");
	assert!(array.is_empty());
	assert_eq!(array.header().expect("header"), vec![0, 64, 64, 64]);
	assert_eq!(array.encode().expect("encode").len(), 8);
}

#[test]
fn zero_values_need_no_bits() {
	let mut array = BitFieldArrayValue::new("zeros", &["a"]).expect("array");
	array.add_entry(ints(&[0])).expect("a").add_entry(ints(&[0])).expect("b");
	assert_eq!(array.field_widths(), vec![0]);
	assert_eq!(array.immediate_size(), 6);
}

#[test]
fn array_items_are_range_checked() {
	assert!(BitFieldArrayItem::int((1 << 31) - 1).is_ok());
	assert!(matches!(BitFieldArrayItem::int(1 << 31), Err(LayoutError::ValueOutOfRange { .. })));
	assert!(matches!(BitFieldArrayItem::int(-1), Err(LayoutError::ValueOutOfRange { .. })));

	let mut array = BitFieldArrayValue::new("raw", &["a"]).expect("array");
	let err = array.add_entry(vec![BitFieldArrayItem::Int(u32::MAX)]).expect_err("raw int too wide");
	assert!(matches!(err, LayoutError::ValueOutOfRange { .. }));
}

#[test]
fn entries_must_match_field_count() {
	let mut array = BitFieldArrayValue::new("pairs", &["a", "b"]).expect("array");
	let err = array.add_entry(ints(&[1])).expect_err("short entry fails");
	assert_eq!(
		err,
		LayoutError::FieldCountMismatch {
			name: "pairs".to_owned(),
			expected: 2,
			got: 1,
		}
	);
}

#[test]
fn records_are_reordered_by_field_name() {
	let mut array = BitFieldArrayValue::new("pairs", &["a", "b"]).expect("array");
	array
		.add_record(&[("b", BitFieldArrayItem::Int(2)), ("a", BitFieldArrayItem::Int(1))])
		.expect("record");
	assert_eq!(array.get("a", 0), Some(&BitFieldArrayItem::Int(1)));
	assert_eq!(array.get("b", 0), Some(&BitFieldArrayItem::Int(2)));

	let err = array
		.add_record(&[("a", BitFieldArrayItem::Int(1)), ("c", BitFieldArrayItem::Int(1))])
		.expect_err("unknown field");
	assert_eq!(err, LayoutError::MissingRecordField { name: "b".to_owned() });
}

#[test]
fn duplicate_field_names_collide() {
	let err = BitFieldArrayValue::new("dup", &["a", "a"]).expect_err("duplicate fails");
	assert!(matches!(err, LayoutError::NameCollision { .. }));
}

#[test]
fn header_words_must_fit_sixteen_bits() {
	let names: Vec<String> = (0..2200).map(|idx| format!("f{idx}")).collect();
	let fields: Vec<&str> = names.iter().map(String::as_str).collect();
	let mut array = BitFieldArrayValue::new("huge", &fields).expect("array");
	array.add_entry(vec![BitFieldArrayItem::Int((1 << 30) + 1); 2200]).expect("entry");
	let err = array.header().expect_err("overflow");
	assert!(matches!(err, LayoutError::HeaderOverflow { word: 68200, .. }));
}

#[test]
fn bit_field_array_member_is_stored_by_reference() {
	let mut builder = StructBuilder::new("table");
	builder.add_uint8("count", 3).expect("count");
	builder.add("entries", sample().into()).expect("entries");
	let bytes = pack(&builder.into_value()).expect("pack");
	assert_eq!(bytes[..8], [0x03, 0, 0, 0, 0x08, 0, 0, 0]);
	assert_eq!(bytes[8..], sample().encode().expect("encode")[..]);
}

#[test]
fn flags_are_single_bits() {
	let mut value = BitFieldValue::new("bitField1", 8).expect("bitfield");
	value
		.add_flag("aFlag", true)
		.expect("aFlag")
		.add_flag("bFlag", false)
		.expect("bFlag")
		.add_flag("cFlag", true)
		.expect("cFlag");
	assert_eq!(value.ty().used_bits(), 3);
	assert_eq!(value.packed_value(), 0b101);
}

#[test]
fn arrays_of_bit_fields_pack_inline() {
	let date = |year: u64, month: u64, day: u64, hour: u64, minute: u64| {
		let mut value = BitFieldValue::new("timeBitField", 32).expect("bitfield");
		value
			.add("year", year, 11)
			.expect("year")
			.add("month", month, 4)
			.expect("month")
			.add("day", day, 5)
			.expect("day")
			.add("hour", hour, 5)
			.expect("hour")
			.add("minute", minute, 6)
			.expect("minute");
		Value::from(value)
	};
	let dates = Value::array(vec![date(2011, 11, 11, 9, 23), date(2012, 12, 12, 10, 24)], None).expect("array");
	assert!(matches!(dates, Value::SimpleArray(_)));

	let mut builder = StructBuilder::new("testStruct35");
	builder.add_immediate("dates", dates).expect("dates");
	let bytes = pack(&builder.into_value()).expect("pack");
	assert_eq!(bytes, vec![0xDB, 0xDF, 0x95, 0x2E, 0xDC, 0x67, 0xA6, 0x30]);
}
