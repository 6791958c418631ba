//! Element names of the `.dez` grammar subset read by the model reader
//!
//! ```text
//! <root>
//!   VERSION*                      optional, one per model version
//!     VERSIONINFO/VERSIONNUMBER   absent on the current version
//!     DATADICT
//!       USERDEFINEDPROPERTIES/USERDEFPROP   ID, NAME
//!       ENTITIES/ENT              ID, NAME, DESC, SCHEMA
//!         PKCON                   NAME, ATTRIBUTEIDS/ATTRIBUTEID*
//!         UNIQUECONS/UNIQUECON    NAME, ATTRIBUTEIDS/ATTRIBUTEID*
//!         ATTRIBUTES/ATTR         ID, NAME, DESC, DT/DTLISTNAME, NNCON/VALUE
//!           USERDEFPROPS/UDP_<id or name>
//!         USERDEFPROPS/UDP_<id or name>
//!       RELATIONSHIPS/REL         ID, NAME, PARENTOBJECTID, CHILDOBJECTID
//!         PAIRS/PAIR              KEYID, FOREIGNKEYID
//!     DIAGRAMS
//!       DIAGRAM                   ID, NAME
//!       CONTROLS/ENTITYCONTROLS/ENTC   ID (entity), DIAGRAMID
//! ```
//!
//! Without `VERSION` elements the root itself holds `DATADICT` and `DIAGRAMS`.

/// One model version of a multi-version document
pub const VERSION: &str = "VERSION";
/// Version header
pub const VERSION_INFO: &str = "VERSIONINFO";
/// Version number; absent on the current version
pub const VERSION_NUMBER: &str = "VERSIONNUMBER";

/// Data dictionary holding entities, relationships and property definitions
pub const DATADICT: &str = "DATADICT";

/// Definitions of user-defined properties
pub const UDP_DICTIONARY: &str = "USERDEFINEDPROPERTIES";
/// One user-defined property definition
pub const UDP_DEFINITION: &str = "USERDEFPROP";
/// User-defined property values of an entity or attribute
pub const UDP_VALUES: &str = "USERDEFPROPS";
/// Tag prefix of one user-defined property value
pub const UDP_TAG_PREFIX: &str = "UDP_";

/// Entity list
pub const ENTITIES: &str = "ENTITIES";
/// One entity
pub const ENTITY: &str = "ENT";
/// Attribute list of an entity
pub const ATTRIBUTES: &str = "ATTRIBUTES";
/// One attribute
pub const ATTRIBUTE: &str = "ATTR";

/// Document identifier
pub const ID: &str = "ID";
/// Name
pub const NAME: &str = "NAME";
/// Description
pub const DESCRIPTION: &str = "DESC";
/// Owning schema
pub const SCHEMA: &str = "SCHEMA";

/// Data type of an attribute
pub const DATA_TYPE: &str = "DT";
/// Declared data type text
pub const DATA_TYPE_NAME: &str = "DTLISTNAME";
/// Not-null constraint
pub const NOT_NULL: &str = "NNCON";
/// Constraint value
pub const VALUE: &str = "VALUE";

/// Primary key constraint
pub const PRIMARY_KEY: &str = "PKCON";
/// Unique constraint list
pub const UNIQUE_KEYS: &str = "UNIQUECONS";
/// One unique constraint
pub const UNIQUE_KEY: &str = "UNIQUECON";
/// Member list of a key
pub const MEMBER_IDS: &str = "ATTRIBUTEIDS";
/// Attribute identifier of a key member
pub const MEMBER_ID: &str = "ATTRIBUTEID";

/// Relationship list
pub const RELATIONSHIPS: &str = "RELATIONSHIPS";
/// One relationship
pub const RELATIONSHIP: &str = "REL";
/// Parent (referenced) entity identifier
pub const PARENT: &str = "PARENTOBJECTID";
/// Child (referencing) entity identifier
pub const CHILD: &str = "CHILDOBJECTID";
/// Attribute pairs of a relationship
pub const PAIRS: &str = "PAIRS";
/// One parent/child attribute pair
pub const PAIR: &str = "PAIR";
/// Parent attribute of a pair
pub const PARENT_MEMBER: &str = "KEYID";
/// Child attribute of a pair
pub const CHILD_MEMBER: &str = "FOREIGNKEYID";

/// Diagram section
pub const DIAGRAMS: &str = "DIAGRAMS";
/// One diagram
pub const DIAGRAM: &str = "DIAGRAM";
/// Controls placed on diagrams
pub const CONTROLS: &str = "CONTROLS";
/// Entity controls
pub const ENTITY_CONTROLS: &str = "ENTITYCONTROLS";
/// One entity shown on a diagram; `ID` is the entity
pub const ENTITY_CONTROL: &str = "ENTC";
/// Diagram an entity control belongs to
pub const DIAGRAM_ID: &str = "DIAGRAMID";

/// `NNCON/VALUE` of a declared NOT NULL constraint
pub const NOT_NULL_SET: &str = "1";
/// `NNCON/VALUE` of a declared nullable column
pub const NOT_NULL_CLEAR: &str = "0";
