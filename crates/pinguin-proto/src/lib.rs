//! Generated gRPC message and service types for the notification submission API.
//! See `proto/pinguin.proto` for the wire contract.

tonic::include_proto!("pinguin.v1");
