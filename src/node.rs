use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

const LEAF: u16 = 0;
const CHILDREN: u16 = 1;

/// Narrows a count or index to the on-disk `u16`, refusing values that would wrap.
pub fn to_u16(value: usize, what: &str) -> std::io::Result<u16> {
	u16::try_from(value).map_err(|_| std::io::Error::new(
		std::io::ErrorKind::InvalidInput,
		format!("{} {} does not fit in 16 bits", what, value),
	))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
	pub value: f64,
	pub column: usize,
}

impl Split {
	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		writer.write_f64::<BigEndian>(self.value)?;
		writer.write_u16::<BigEndian>(to_u16(self.column, "column")?)?;

		Ok(())
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let value = reader.read_f64::<BigEndian>()?;
		let column = reader.read_u16::<BigEndian>()? as usize;

		Ok(Self { value, column })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	Leaf(usize),
	Children {
		left: Box<Node>,
		right: Box<Node>,
		split: Split,
	},
}

impl Node {
	pub fn predict(&self, x: &[f64]) -> usize {
		match &self {
			Node::Leaf(class) => *class,
			Node::Children { left, right, split } => {
				if x[split.column] <= split.value {
					left.predict(x)
				} else {
					right.predict(x)
				}
			},
		}
	}

	/// Largest class index and column index referenced anywhere below this node.
	pub fn max_indices(&self) -> (usize, Option<usize>) {
		match &self {
			Node::Leaf(class) => (*class, None),
			Node::Children { left, right, split } => {
				let (left_class, left_column) = left.max_indices();
				let (right_class, right_column) = right.max_indices();
				let column = [left_column, right_column, Some(split.column)]
					.into_iter()
					.flatten()
					.max();

				(left_class.max(right_class), column)
			},
		}
	}

	pub fn depth(&self) -> usize {
		match &self {
			Node::Leaf(_) => 1,
			Node::Children { left, right, .. } => 1 + left.depth().max(right.depth()),
		}
	}

	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		match &self {
			Node::Leaf(class) => {
				writer.write_u16::<BigEndian>(LEAF)?;
				writer.write_u16::<BigEndian>(to_u16(*class, "class")?)?;
			},
			Node::Children { left, right, split } => {
				writer.write_u16::<BigEndian>(CHILDREN)?;
				split.serialize(writer)?;
				left.serialize(writer)?;
				right.serialize(writer)?;
			}
		}

		Ok(())
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		match reader.read_u16::<BigEndian>()? {
			LEAF => Ok(Node::Leaf(reader.read_u16::<BigEndian>()? as usize)),
			CHILDREN => {
				let split = Split::deserialize(reader)?;
				let left = Box::new(Node::deserialize(reader)?);
				let right = Box::new(Node::deserialize(reader)?);

				Ok(Node::Children { split, left, right })
			},
			i => Err(std::io::Error::new(
				std::io::ErrorKind::InvalidData,
				format!("unknown node type {:?}", i),
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn stump() -> Node {
		Node::Children {
			split: Split { value: 2.5, column: 1 },
			left: Box::new(Node::Leaf(0)),
			right: Box::new(Node::Leaf(3)),
		}
	}

	#[test]
	fn threshold_is_inclusive_on_the_left() {
		let node = stump();
		assert_eq!(node.predict(&[0.0, 2.5]), 0);
		assert_eq!(node.predict(&[0.0, 2.6]), 3);
	}

	#[test]
	fn serialization_works() -> std::io::Result<()> {
		let node = stump();
		let mut bytes = Vec::new();
		node.serialize(&mut bytes)?;

		assert_eq!(Node::deserialize(&mut bytes.as_slice())?, node);
		Ok(())
	}

	#[test]
	fn unknown_tag_is_invalid_data() {
		let bytes = [0u8, 7];
		let err = Node::deserialize(&mut &bytes[..]).unwrap_err();
		assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
	}

	#[test]
	fn oversized_class_is_refused() {
		let mut bytes = Vec::new();
		let err = Node::Leaf(70_000).serialize(&mut bytes).unwrap_err();
		assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
		assert_eq!(to_u16(65_535, "class").unwrap(), u16::MAX);
	}

	#[test]
	fn reports_indices_and_depth() {
		let node = stump();
		assert_eq!(node.max_indices(), (3, Some(1)));
		assert_eq!(node.depth(), 2);
	}
}
