use crate::layout::{
	BlobOptions, BuilderOptions, Constant, IntType, LayoutError, Literal, Record, StringOptions, StructBuilder, Type, Value,
	pack,
};

#[test]
fn values_stay_in_lock_step_with_members() {
	let mut builder = StructBuilder::new("testStruct7");
	builder
		.add_int8("anInt8", 1)
		.expect("anInt8")
		.add_int32("anInt32", 2)
		.expect("anInt32")
		.add_int16("anInt16", 3)
		.expect("anInt16")
		.finalize()
		.expect("finalize");
	assert_eq!(builder.immediate_size(), 12);
	let value = builder.build();
	assert_eq!(value.values().len(), value.ty().members().len());
	for (member, value) in value.ty().members().iter().zip(value.values()) {
		assert_eq!(member.padding, matches!(value, Value::Padding));
	}
}

#[test]
fn immediate_values_are_inlined_and_others_referenced() {
	let mut builder = StructBuilder::new("mixed");
	builder.add("n", Value::int32(1).expect("int")).expect("n");
	builder.add("s", Value::string("x").expect("string")).expect("s");
	let ty = builder.struct_type();
	assert_eq!(ty.member("n").map(|member| member.ty.clone()), Some(Type::Int(IntType::INT32)));
	assert_eq!(ty.member("s").map(|member| member.ty.to_string()), Some("ref32<char[]>".to_owned()));
}

#[test]
fn add_immediate_forces_inline_storage() {
	let mut builder = StructBuilder::new("inline");
	builder.add_immediate("s", Value::string("abc").expect("string")).expect("s");
	assert_eq!(builder.immediate_size(), 4);
	assert_eq!(pack(&builder.into_value()).expect("pack"), b"abc\0".to_vec());
}

#[test]
fn duplicate_member_names_are_rejected() {
	let mut builder = StructBuilder::new("dup");
	builder.add_int8("x", 1).expect("x");
	let err = builder.add_char("x", 'y').expect_err("duplicate");
	assert_eq!(
		err,
		LayoutError::NameCollision {
			owner: "dup".to_owned(),
			name: "x".to_owned(),
		}
	);
}

#[test]
fn members_cannot_be_added_after_finalize() {
	let mut builder = StructBuilder::new("frozen");
	builder.finalize().expect("finalize");
	let err = builder.add_int8("late", 1).expect_err("frozen");
	assert_eq!(err, LayoutError::StructAlreadyFinalized { name: "frozen".to_owned() });
	assert!(matches!(builder.finalize(), Err(LayoutError::StructAlreadyFinalized { .. })));
}

#[test]
fn out_of_range_integers_are_rejected() {
	let mut builder = StructBuilder::new("ranges");
	assert!(matches!(builder.add_uint8("u", 256), Err(LayoutError::ValueOutOfRange { .. })));
	assert!(matches!(builder.add_int8("i", -129), Err(LayoutError::ValueOutOfRange { .. })));
	assert!(builder.add_uint64("big", u64::MAX).is_ok());
	assert!(builder.add_int64("small", i64::MIN).is_ok());
}

#[test]
fn fixed_width_strings_need_a_value() {
	let mut builder = StructBuilder::new("strings");
	let options = StringOptions {
		fixed_width: Some(8),
		..StringOptions::default()
	};
	let err = builder.add_string("s", None, options).expect_err("null fixed string");
	assert!(matches!(err, LayoutError::InvalidOperation { .. }));
	builder.add_string("t", Some("abc"), options).expect("fixed string");
	let member = builder.struct_type().member("t").map(|member| member.ty.to_string());
	assert_eq!(member, Some("ref32<char[8]>".to_owned()));
}

#[test]
fn fixed_width_string_overflow_fails() {
	let mut builder = StructBuilder::new("strings");
	let options = StringOptions {
		fixed_width: Some(3),
		..StringOptions::default()
	};
	let err = builder.add_string("s", Some("abcd"), options).expect_err("too long");
	assert_eq!(err, LayoutError::FixedLengthExceeded { len: 5, fixed: 3 });
}

#[test]
fn strings_without_terminator_pack_only_text() {
	let mut builder = StructBuilder::new("bare");
	let options = StringOptions {
		omit_terminator: true,
		..StringOptions::default()
	};
	builder.add_string("s", Some("ab"), options).expect("s");
	assert_eq!(pack(&builder.into_value()).expect("pack"), vec![0x04, 0, 0, 0, b'a', b'b']);
}

#[test]
fn blob_alignment_override_is_honored() {
	let mut builder = StructBuilder::new("blobs");
	builder.add_uint8("a", 1).expect("a");
	builder.add_string("s", Some("x"), StringOptions::default()).expect("s");
	let options = BlobOptions {
		alignment: Some(8),
		..BlobOptions::default()
	};
	builder.add_blob("b", vec![true, true], options).expect("b");
	let bytes = pack(&builder.into_value()).expect("pack");
	assert_eq!(bytes.len(), 17);
	assert_eq!(bytes[8..12], [0x10, 0, 0, 0]);
	assert_eq!(bytes[16], 0x03);
}

#[test]
fn record_fields_are_added_by_name() {
	let mut record = Record::new();
	record
		.set("anInt8", 8_i64)
		.set("aString", "hello")
		.set("noString", None::<&str>)
		.set("bits", vec![1_i64, 0, 1])
		.set("names", vec!["a", "b"]);

	let mut builder = StructBuilder::new("fromRecord");
	builder.add_int_from_record("anInt8", IntType::INT8, &record).expect("anInt8");
	builder.add_string_from_record("aString", StringOptions::default(), &record).expect("aString");
	builder.add_string_from_record("noString", StringOptions::default(), &record).expect("noString");
	builder.add_blob_from_record("bits", BlobOptions::default(), &record).expect("bits");
	builder.add_from_record("names", &record).expect("names");

	let ty = builder.struct_type();
	assert_eq!(ty.member("anInt8").map(|member| member.size), Some(1));
	assert_eq!(ty.member("names").map(|member| member.ty.to_string()), Some("ref32<ref32<char[]>[]>".to_owned()));

	let err = builder.add_from_record("missing", &record).expect_err("missing key");
	assert_eq!(err, LayoutError::MissingRecordField { name: "missing".to_owned() });
}

#[test]
fn literal_members_follow_default_storage() {
	let mut builder = StructBuilder::new("literals");
	builder.add_literal("n", &Literal::Integer(5)).expect("n");
	builder.add_literal("none", &Literal::Null).expect("none");
	let ty = builder.struct_type();
	assert_eq!(ty.member("n").map(|member| member.ty.to_string()), Some("int32_t".to_owned()));
	assert_eq!(ty.member("none").map(|member| member.ty.to_string()), Some("ref32<void>".to_owned()));
}

#[test]
fn reference_arrays_use_requested_pointer_width() {
	let mut builder = StructBuilder::new("refs");
	let values = vec![Value::int32(1).expect("1"), Value::int32(2).expect("2")];
	builder.add_reference_array("ints", values, Some(2), 16).expect("ints");
	assert_eq!(builder.immediate_size(), 4);
	let bytes = pack(&builder.into_value()).expect("pack");
	assert_eq!(bytes, vec![0x04, 0x00, 0x08, 0x00, 0x01, 0, 0, 0, 0x02, 0, 0, 0]);
}

#[test]
fn constants_occupy_no_bytes() {
	let mut builder = StructBuilder::new("withConstants");
	builder
		.add_int32_constant("MAGIC", 0x1234)
		.expect("MAGIC")
		.add_char_constant("SEP", ';')
		.expect("SEP")
		.add_string_constant("NAME", "demo")
		.expect("NAME");
	assert_eq!(builder.immediate_size(), 0);
	assert_eq!(builder.struct_type().constant("SEP"), Some(&Constant::Char(b';')));

	let err = builder.add_int32_constant("MAGIC", 1).expect_err("duplicate constant");
	assert!(matches!(err, LayoutError::NameCollision { .. }));
	assert!(matches!(builder.add_char_constant("BAD", 'ü'), Err(LayoutError::InvalidCharacter { .. })));
}

#[test]
fn finalize_alignment_follows_options() {
	let options = BuilderOptions {
		finalize_alignment: 8,
		..BuilderOptions::default()
	};
	let mut builder = StructBuilder::with_options("wide", options);
	builder.add_uint8("a", 1).expect("a").finalize().expect("finalize");
	assert_eq!(builder.immediate_size(), 8);
	assert_eq!(builder.options().finalize_alignment, 8);
}

#[test]
fn sized_reference_shorthands() {
	let mut builder = StructBuilder::new("refs");
	builder
		.add_ref8("a", Value::string("a").expect("a"))
		.expect("a")
		.add_ref16("b", Value::string("b").expect("b"))
		.expect("b")
		.add_ref32("c", Value::Null)
		.expect("c");
	assert_eq!(builder.immediate_size(), 8);
	let bytes = pack(&builder.into_value()).expect("pack");
	assert_eq!(bytes, vec![0x08, 0x00, 0x0A, 0x00, 0, 0, 0, 0, b'a', 0, b'b', 0]);
}

#[test]
fn arrays_of_references_use_the_builder_pointer_width() {
	let options = BuilderOptions {
		pointer_bits: 16,
		..BuilderOptions::default()
	};
	let mut builder = StructBuilder::with_options("p", options);
	let names = vec![Value::string("ab").expect("ab"), Value::string("c").expect("c")];
	builder.add_array("names", names, None).expect("names");

	let member = builder.struct_type().member("names").expect("member");
	assert_eq!(member.ty.to_string(), "ref16<ref16<char[]>[]>");
	let Type::Reference(outer) = &member.ty else {
		panic!("expected reference");
	};
	let Type::ReferenceArray(inner) = outer.target.as_ref() else {
		panic!("expected reference array target");
	};
	assert_eq!(inner.pointer_bits, 16);

	let bytes = pack(&builder.into_value()).expect("pack");
	assert_eq!(bytes, vec![0x02, 0x00, 0x06, 0x00, 0x09, 0x00, b'a', b'b', 0, b'c', 0]);
}

#[test]
fn literal_sequences_use_the_builder_pointer_width() {
	let options = BuilderOptions {
		pointer_bits: 8,
		..BuilderOptions::default()
	};
	let mut builder = StructBuilder::with_options("p", options);
	let literal = Literal::from(vec![Some("x"), None]);
	builder.add_literal("names", &literal).expect("names");
	let member = builder.struct_type().member("names").expect("member");
	assert_eq!(member.ty.to_string(), "ref8<ref8<char[]>[]>");

	let bytes = pack(&builder.into_value()).expect("pack");
	assert_eq!(bytes, vec![0x01, 0x03, 0x00, b'x', 0]);
}
